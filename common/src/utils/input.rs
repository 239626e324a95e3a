// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::io::BufRead;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Non-blocking access to stdin lines.
///
/// Reading stdin blocks and cannot be interrupted portably, so a
/// dedicated thread owns the read loop and hands completed lines over a
/// channel. The consumer polls with a timeout and keeps re-checking its
/// own shutdown conditions in between.
pub struct InputHandle {
    rx: mpsc::Receiver<String>,
}

/// Why no line was returned this round.
#[derive(Debug, PartialEq, Eq)]
pub enum InputWait {
    /// Nothing typed yet; poll again.
    Quiet,
    /// Stdin reached end of file or failed; no more lines will come.
    Closed,
}

impl InputHandle {
    pub fn start() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(text) => {
                        if tx.send(text).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });
        Self { rx }
    }

    /// Waits up to `timeout` for the next typed line.
    pub fn poll_line(&self, timeout: Duration) -> Result<String, InputWait> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => InputWait::Quiet,
            RecvTimeoutError::Disconnected => InputWait::Closed,
        })
    }
}
