// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Message framing over the six-octet payload channel.
//!
//! Outbound text is cut into [`PAYLOAD_LEN`]-octet fragments, the last one
//! right-padded with `0x00`, and terminated by a sentinel fragment whose
//! first octet is `0x01`. Inbound fragments feed a [`Reassembler`] that
//! rebuilds display lines: `0x00` octets are padding and ignored, `0x01`
//! closes the current line (message boundary), anything else is text.
//!
//! Reassembly is stateless per fragment. There is no per-sender session:
//! every peer on the segment writes into the same stream, in kernel
//! delivery order.

use arpchat_protocols::PAYLOAD_LEN;

/// End-of-message marker frame payload.
pub const SENTINEL: [u8; PAYLOAD_LEN] = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00];

const PADDING: u8 = 0x00;
const MESSAGE_BREAK: u8 = 0x01;

/// Cuts a message into payload fragments, sentinel included.
///
/// An empty message still yields the sentinel, so even a bare return key
/// produces a visible message break on the peers.
pub fn fragments(text: &str) -> Vec<[u8; PAYLOAD_LEN]> {
    let bytes = text.as_bytes();
    let mut out: Vec<[u8; PAYLOAD_LEN]> = Vec::with_capacity(bytes.len() / PAYLOAD_LEN + 2);

    for chunk in bytes.chunks(PAYLOAD_LEN) {
        let mut payload = [PADDING; PAYLOAD_LEN];
        payload[..chunk.len()].copy_from_slice(chunk);
        out.push(payload);
    }

    out.push(SENTINEL);
    out
}

/// Rebuilds display lines from incoming fragments.
///
/// Keeps the raw octet stream append-only next to a derived cache of
/// closed lines; the line under assembly stays open until a message break
/// arrives or the wrap column is reached.
#[derive(Debug)]
pub struct Reassembler {
    stream: Vec<u8>,
    closed: Vec<String>,
    current: String,
    wrap: usize,
}

impl Reassembler {
    pub fn new(wrap: usize) -> Self {
        Self {
            stream: Vec::new(),
            closed: Vec::new(),
            current: String::new(),
            wrap: wrap.max(1),
        }
    }

    /// Feeds one fragment's payload octets through the line builder.
    pub fn push_fragment(&mut self, payload: &[u8; PAYLOAD_LEN]) {
        for &octet in payload {
            self.stream.push(octet);
            match octet {
                PADDING => {}
                MESSAGE_BREAK => self.close_line(),
                _ => {
                    if self.current.len() == self.wrap {
                        self.close_line();
                    }
                    self.current.push(octet as char);
                }
            }
        }
    }

    fn close_line(&mut self) {
        self.closed.push(std::mem::take(&mut self.current));
    }

    /// All lines closed so far, oldest first.
    pub fn closed_lines(&self) -> &[String] {
        &self.closed
    }

    /// The line still under assembly, possibly empty.
    pub fn current_line(&self) -> &str {
        &self.current
    }

    /// Every payload octet ever received, padding and breaks included.
    pub fn stream_len(&self) -> usize {
        self.stream.len()
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
