// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use arpchat_common::warn;
use arpchat_protocols::ArpFrame;
use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;

/// Frames kept before the consumer stops draining. Overflow evicts the
/// oldest entry.
pub const DEFAULT_CAPACITY: usize = 4096;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// Popping an empty queue is a caller bug: the consumer must drain
    /// `len()` frames per wake-up and no more.
    #[error("attempt to pop from an empty packet queue")]
    Empty,
}

/// Thread-safe FIFO between the receiver thread and the consumer.
///
/// Wake-up delivery lives elsewhere (the notifier); this type only
/// guarantees insertion order and mutual exclusion.
#[derive(Debug)]
pub struct PacketQueue {
    frames: Mutex<VecDeque<ArpFrame>>,
    capacity: usize,
}

impl Default for PacketQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl PacketQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Appends a frame, evicting the oldest one when full.
    pub fn push(&self, frame: ArpFrame) {
        let mut frames = self.frames.lock().unwrap();
        if frames.len() == self.capacity {
            frames.pop_front();
            warn!("packet queue full, dropping the oldest frame");
        }
        frames.push_back(frame);
    }

    /// Removes and returns the oldest frame.
    pub fn pop(&self) -> Result<ArpFrame, QueueError> {
        self.frames.lock().unwrap().pop_front().ok_or(QueueError::Empty)
    }

    pub fn len(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
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
