// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! The terminal chat frontend.
//!
//! Three concurrent actors share the session:
//!
//! * the **receiver thread** (inside the transport) queues accepted frames
//!   and signals through the notifier;
//! * the **poller thread** (spawned here) waits on the notifier, drains
//!   the queue on every wake and prints lines as the reassembler closes
//!   them;
//! * the **main loop** reads typed lines and broadcasts them.
//!
//! Everything stops on the shared running flag: `/quit`, stdin EOF,
//! SIGINT and fatal errors on any thread all funnel into it.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Context;
use arpchat_common::config::Config;
use arpchat_common::utils::input::{InputHandle, InputWait};
use arpchat_common::{debug, error, info};
use arpchat_core::framer::Reassembler;
use arpchat_core::network::notifier::{
    DEFAULT_SOCKET_PATH, NotifierServer, Wake, WakeReceiver, WAKE_TIMEOUT,
};
use arpchat_core::queue::PacketQueue;
use arpchat_core::transport::Transport;

use crate::terminal::print;

const QUIT_COMMAND: &str = "/quit";

/// Pause between main-loop iterations while waiting for keyboard input.
const INPUT_POLL: Duration = Duration::from_micros(360);

/// Cooperative pause between poller iterations.
const POLL_YIELD: Duration = Duration::from_micros(250);

/// Runs one chat session over an opened transport until shutdown.
pub fn run(transport: &mut Transport, cfg: &Config) -> anyhow::Result<()> {
    // Bind before the receiver thread starts, so its connect retries land
    // on a listening socket. Accepting still blocks until it does.
    let server = NotifierServer::bind(Path::new(DEFAULT_SOCKET_PATH))?;
    transport.start()?;
    let wake: WakeReceiver = server.accept(WAKE_TIMEOUT)?;
    info!(verbosity = 1, "receiver connected to the notifier");

    let running = transport.running();
    let queue = transport.queue();
    let reassembler = Arc::new(Mutex::new(Reassembler::new(cfg.wrap_width)));

    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::Relaxed))
            .context("installing the SIGINT handler")?;
    }

    let poller = spawn_poller(wake, queue, reassembler, Arc::clone(&running));

    print::welcome(transport.local());

    let input = InputHandle::start();
    let mut outcome: anyhow::Result<()> = Ok(());
    while running.load(Ordering::Relaxed) {
        match input.poll_line(INPUT_POLL) {
            Ok(line) if line.trim() == QUIT_COMMAND => break,
            Ok(line) => match transport.send_text(&line) {
                Ok(frames) => {
                    debug!(verbosity = 1, "message sent as {frames} frame(s)");
                    print::own_line(&line);
                }
                Err(e) => {
                    outcome = Err(e.context("sending message"));
                    break;
                }
            },
            Err(InputWait::Quiet) => {}
            Err(InputWait::Closed) => break,
        }
    }

    running.store(false, Ordering::Relaxed);
    if poller.join().is_err() {
        error!("poller thread panicked during shutdown");
    }

    outcome
}

/// The consumer side of the wake channel.
///
/// One wake can stand for many frames, so every wake drains the whole
/// queue: read the depth once, pop exactly that many.
fn spawn_poller(
    mut wake: WakeReceiver,
    queue: Arc<PacketQueue>,
    reassembler: Arc<Mutex<Reassembler>>,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut printed = 0usize;

        while running.load(Ordering::Relaxed) {
            match wake.wait() {
                Ok(Wake::Woken) => {
                    let pending = queue.len();
                    let mut reassembler = reassembler.lock().unwrap();
                    for _ in 0..pending {
                        match queue.pop() {
                            Ok(frame) => reassembler.push_fragment(&frame.payload()),
                            Err(e) => {
                                error!("queue drained out from under the consumer: {e}");
                                break;
                            }
                        }
                    }

                    let lines = reassembler.closed_lines();
                    for line in &lines[printed..] {
                        print::peer_line(line);
                    }
                    printed = lines.len();
                }
                Ok(Wake::TimedOut) => {
                    debug!(verbosity = 2, "no wake within the window");
                }
                Err(e) => {
                    error!("notifier wait failed: {e}");
                    break;
                }
            }

            thread::sleep(POLL_YIELD);
        }

        running.store(false, Ordering::Relaxed);
    })
}
