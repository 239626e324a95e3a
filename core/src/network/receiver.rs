// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! The receive loop: one dedicated thread pulling frames off the raw
//! channel, filtering them, queueing the survivors and waking the
//! consumer through the notifier.
//!
//! The loop is cooperative: it re-checks the shared `running` flag at
//! least once per receive window (bounded by
//! [`crate::network::channel::READ_TIMEOUT`]), and any fatal I/O error
//! clears the flag so the rest of the process winds down too.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use arpchat_common::{debug, error};
use arpchat_protocols::{ArpFrame, DecodeError};
use pnet::datalink::DataLinkReceiver;

use crate::filter::{FieldName, FilterSet};
use crate::network::notifier::NotifierClient;
use crate::queue::PacketQueue;

/// Cooperative pause between loop iterations.
const YIELD_INTERVAL: Duration = Duration::from_micros(250);

/// What happened to one received frame.
#[derive(Debug, PartialEq, Eq)]
pub enum Admission {
    /// Enqueued; carries the queue depth right after the push.
    Accepted { depth: usize },
    /// Dropped by the named filter rule.
    Filtered(FieldName),
}

/// Decodes a wire image and runs it through filter and queue.
pub fn admit(
    bytes: &[u8],
    filter: &FilterSet,
    queue: &PacketQueue,
) -> Result<Admission, DecodeError> {
    let frame = ArpFrame::decode(bytes)?;

    if let Some(field) = filter.verdict(&frame) {
        return Ok(Admission::Filtered(field));
    }

    queue.push(frame);
    Ok(Admission::Accepted { depth: queue.len() })
}

/// Starts the receiver thread.
pub fn spawn(
    rx: Box<dyn DataLinkReceiver>,
    queue: Arc<PacketQueue>,
    filter: FilterSet,
    running: Arc<AtomicBool>,
    notifier_path: PathBuf,
) -> JoinHandle<()> {
    thread::spawn(move || run(rx, queue, filter, running, notifier_path))
}

fn run(
    mut rx: Box<dyn DataLinkReceiver>,
    queue: Arc<PacketQueue>,
    filter: FilterSet,
    running: Arc<AtomicBool>,
    notifier_path: PathBuf,
) {
    let mut notifier = match NotifierClient::connect(&notifier_path) {
        Ok(client) => client,
        Err(e) => {
            error!("receiver cannot reach the notifier: {e}");
            running.store(false, Ordering::Relaxed);
            return;
        }
    };

    while running.load(Ordering::Relaxed) {
        match rx.next() {
            Ok(bytes) if bytes.is_empty() => {
                error!("empty read from the raw channel, stopping the receiver");
                break;
            }
            Ok(bytes) => match admit(bytes, &filter, &queue) {
                Ok(Admission::Accepted { depth }) => {
                    debug!(verbosity = 2, "frame accepted, queue depth {depth}");
                    if let Err(e) = notifier.notify(depth) {
                        error!("receiver cannot wake the consumer: {e}");
                        break;
                    }
                }
                Ok(Admission::Filtered(field)) => {
                    debug!(verbosity = 2, "frame dropped by the {field} rule");
                }
                Err(DecodeError::Truncated(len)) => {
                    debug!(verbosity = 2, "ignoring undecodable frame of {len} octets");
                }
            },
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock
                        | std::io::ErrorKind::TimedOut
                        | std::io::ErrorKind::Interrupted
                ) =>
            {
                debug!(verbosity = 2, "receive window elapsed without frames");
            }
            Err(e) => {
                error!("raw receive failed: {e}");
                break;
            }
        }

        thread::sleep(YIELD_INTERVAL);
    }

    // Reached on fatal errors and on cooperative shutdown alike; the flag
    // is authoritative either way.
    running.store(false, Ordering::Relaxed);
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
    use crate::filter::FilterValue;

    fn encoded_frame(opcode: u16) -> Vec<u8> {
        let frame = ArpFrame {
            opcode,
            ..ArpFrame::default()
        };
        frame.encode().unwrap().to_vec()
    }

    #[test]
    fn accept_all_filter_enqueues_everything() {
        let queue = PacketQueue::new();
        let filter = FilterSet::new();

        let outcome = admit(&encoded_frame(1), &filter, &queue).unwrap();
        assert_eq!(outcome, Admission::Accepted { depth: 1 });

        let outcome = admit(&encoded_frame(2), &filter, &queue).unwrap();
        assert_eq!(outcome, Admission::Accepted { depth: 2 });
    }

    #[test]
    fn filtered_frames_never_reach_the_queue() {
        let queue = PacketQueue::new();
        let mut filter = FilterSet::new();
        filter.insert(FieldName::Opcode, FilterValue::Word(2));

        let outcome = admit(&encoded_frame(1), &filter, &queue).unwrap();
        assert_eq!(outcome, Admission::Filtered(FieldName::Opcode));
        assert_eq!(queue.len(), 0);

        let outcome = admit(&encoded_frame(2), &filter, &queue).unwrap();
        assert_eq!(outcome, Admission::Accepted { depth: 1 });
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn short_frames_are_a_decode_error() {
        let queue = PacketQueue::new();
        let filter = FilterSet::new();

        let result = admit(&encoded_frame(1)[..30], &filter, &queue);
        assert_eq!(result.unwrap_err(), DecodeError::Truncated(30));
        assert_eq!(queue.len(), 0);
    }
}
