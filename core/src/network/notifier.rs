// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! The wake-up channel between the receiver thread and the consumer.
//!
//! A Unix stream socket pair on a well-known path. The consumer side binds
//! and accepts exactly one connection; the receiver connects and writes the
//! current queue depth after each accepted frame. The depth text is not a
//! protocol; readers discard it. The only guarantee is at-least-one-wake
//! per batch of queued frames, which is why consumers must drain the whole
//! queue on every wake.
//!
//! The path is unlinked before binding so a crashed previous run does not
//! block a restart.

use std::io::{ErrorKind, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SOCKET_PATH: &str = "/tmp/.arpchat.uddsocket.server";

/// Bound on one blocking wait for a wake byte, matching the raw channel's
/// receive window.
pub const WAKE_TIMEOUT: Duration = Duration::from_secs(3);

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(1);
const WAKE_BUF_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("cannot bind notifier socket '{path}': {source}")]
    Bind {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot accept a notifier connection: {0}")]
    Accept(std::io::Error),
    #[error("cannot connect notifier socket after {CONNECT_ATTEMPTS} attempts: {0}")]
    Connect(std::io::Error),
    #[error("notifier write failed: {0}")]
    Write(std::io::Error),
    #[error("notifier read failed: {0}")]
    Read(std::io::Error),
    #[error("notifier peer closed the socket")]
    Closed,
}

/// Consumer-side endpoint. Owns the filesystem path for its lifetime.
pub struct NotifierServer {
    listener: UnixListener,
    path: PathBuf,
}

impl NotifierServer {
    pub fn bind(path: &Path) -> Result<Self, NotifierError> {
        // A stale socket from a previous run would make bind fail.
        let _ = std::fs::remove_file(path);

        let listener = UnixListener::bind(path).map_err(|source| NotifierError::Bind {
            path: path.display().to_string(),
            source,
        })?;

        Ok(Self {
            listener,
            path: path.to_path_buf(),
        })
    }

    /// Blocks until the producer connects. Called exactly once, at startup.
    pub fn accept(&self, wake_timeout: Duration) -> Result<WakeReceiver, NotifierError> {
        let (stream, _) = self.listener.accept().map_err(NotifierError::Accept)?;
        stream
            .set_read_timeout(Some(wake_timeout))
            .map_err(NotifierError::Accept)?;
        Ok(WakeReceiver { stream })
    }
}

impl Drop for NotifierServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Wake {
    /// At least one wake arrived; drain the queue now.
    Woken,
    /// The wait elapsed quietly. Not an error.
    TimedOut,
}

/// The accepted consumer end of the socket pair.
pub struct WakeReceiver {
    stream: UnixStream,
}

impl WakeReceiver {
    /// Waits for the next wake, discarding whatever bytes carried it.
    pub fn wait(&mut self) -> Result<Wake, NotifierError> {
        let mut buf = [0u8; WAKE_BUF_LEN];
        match self.stream.read(&mut buf) {
            Ok(0) => Err(NotifierError::Closed),
            Ok(_) => Ok(Wake::Woken),
            Err(e) if matches!(
                e.kind(),
                ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
            ) =>
            {
                Ok(Wake::TimedOut)
            }
            Err(e) => Err(NotifierError::Read(e)),
        }
    }
}

/// Producer-side endpoint, held by the receiver thread.
pub struct NotifierClient {
    stream: UnixStream,
}

impl NotifierClient {
    /// Connects to the consumer, retrying briefly.
    ///
    /// The consumer binds before the receiver thread starts, so the retry
    /// window only has to cover scheduler jitter.
    pub fn connect(path: &Path) -> Result<Self, NotifierError> {
        let mut last_err = std::io::Error::from(ErrorKind::NotFound);

        for attempt in 1..=CONNECT_ATTEMPTS {
            match UnixStream::connect(path) {
                Ok(stream) => return Ok(Self { stream }),
                Err(e) => last_err = e,
            }
            if attempt < CONNECT_ATTEMPTS {
                thread::sleep(CONNECT_RETRY_DELAY);
            }
        }

        Err(NotifierError::Connect(last_err))
    }

    /// Signals the consumer, carrying the queue depth as readable text.
    pub fn notify(&mut self, queue_depth: usize) -> Result<(), NotifierError> {
        self.stream
            .write_all(queue_depth.to_string().as_bytes())
            .map_err(NotifierError::Write)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_socket(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(".arpchat-test-{}-{}.sock", tag, std::process::id()))
    }

    #[test]
    fn wake_round_trip() {
        let path = temp_socket("roundtrip");
        let server = NotifierServer::bind(&path).unwrap();

        let client_path = path.clone();
        let producer = thread::spawn(move || {
            let mut client = NotifierClient::connect(&client_path).unwrap();
            client.notify(3).unwrap();
        });

        let mut receiver = server.accept(Duration::from_secs(1)).unwrap();
        assert_eq!(receiver.wait().unwrap(), Wake::Woken);
        producer.join().unwrap();
    }

    #[test]
    fn quiet_wait_times_out_without_error() {
        let path = temp_socket("timeout");
        let server = NotifierServer::bind(&path).unwrap();

        let client_path = path.clone();
        let producer = thread::spawn(move || {
            let client = NotifierClient::connect(&client_path).unwrap();
            thread::sleep(Duration::from_millis(200));
            drop(client);
        });

        let mut receiver = server.accept(Duration::from_millis(50)).unwrap();
        assert_eq!(receiver.wait().unwrap(), Wake::TimedOut);
        producer.join().unwrap();
    }

    #[test]
    fn peer_close_is_reported() {
        let path = temp_socket("close");
        let server = NotifierServer::bind(&path).unwrap();

        let client_path = path.clone();
        let producer = thread::spawn(move || {
            let client = NotifierClient::connect(&client_path).unwrap();
            drop(client);
        });

        let mut receiver = server.accept(Duration::from_secs(1)).unwrap();
        producer.join().unwrap();
        assert!(matches!(receiver.wait(), Err(NotifierError::Closed)));
    }

    #[test]
    fn rebinding_over_a_stale_path_succeeds() {
        let path = temp_socket("rebind");
        let first = NotifierServer::bind(&path).unwrap();
        // Simulate a crash that leaves the socket file behind.
        std::mem::forget(first);
        let _second = NotifierServer::bind(&path).expect("stale socket should be unlinked");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn connect_without_server_exhausts_retries() {
        let path = temp_socket("noserver");
        let result = NotifierClient::connect(&path);
        assert!(matches!(result, Err(NotifierError::Connect(_))));
    }
}
