// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Equality filtering over decoded frames.
//!
//! A filter is a set of `(field, expected value)` rules. A frame passes
//! only if every rule matches the field of the same name; with no rules,
//! every frame passes. The engine works purely on the host-order decoded
//! view and knows nothing about wire layout.

use arpchat_common::profile::FilterProfile;
use arpchat_protocols::ArpFrame;
use pnet::util::MacAddr;
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

/// The closed set of filterable frame fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldName {
    FrameType,
    HwType,
    ProtoType,
    HwSize,
    ProtoSize,
    Opcode,
    SenderMac,
    SenderIp,
    TargetMac,
    TargetIp,
}

impl FieldName {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::FrameType => "frameType",
            FieldName::HwType => "hwType",
            FieldName::ProtoType => "protType",
            FieldName::HwSize => "hwSize",
            FieldName::ProtoSize => "protSize",
            FieldName::Opcode => "opcode",
            FieldName::SenderMac => "senderMAC",
            FieldName::SenderIp => "senderIp",
            FieldName::TargetMac => "targetMAC",
            FieldName::TargetIp => "targetIp",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An expected value, one variant per field width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterValue {
    Byte(u8),
    Word(u16),
    Mac(MacAddr),
    Ip(Ipv4Addr),
}

/// The rule set applied to every received frame.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    rules: BTreeMap<FieldName, FilterValue>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the rule for `field`.
    pub fn insert(&mut self, field: FieldName, value: FilterValue) {
        self.rules.insert(field, value);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the first rule the frame fails, or `None` if it passes.
    pub fn verdict(&self, frame: &ArpFrame) -> Option<FieldName> {
        self.rules
            .iter()
            .find(|(field, expected)| !evaluate(**field, expected, frame))
            .map(|(field, _)| *field)
    }

    pub fn matches(&self, frame: &ArpFrame) -> bool {
        self.verdict(frame).is_none()
    }
}

/// Compares one expected value against the named field of a frame.
///
/// A rule whose value variant does not fit the field width can never
/// match, so it drops everything.
fn evaluate(field: FieldName, expected: &FilterValue, frame: &ArpFrame) -> bool {
    match (field, expected) {
        (FieldName::FrameType, FilterValue::Word(v)) => *v == frame.frame_type,
        (FieldName::HwType, FilterValue::Word(v)) => *v == frame.hw_type,
        (FieldName::ProtoType, FilterValue::Word(v)) => *v == frame.proto_type,
        (FieldName::HwSize, FilterValue::Byte(v)) => *v == frame.hw_size,
        (FieldName::ProtoSize, FilterValue::Byte(v)) => *v == frame.proto_size,
        (FieldName::Opcode, FilterValue::Word(v)) => *v == frame.opcode,
        (FieldName::SenderMac, FilterValue::Mac(v)) => *v == frame.sender_mac,
        (FieldName::SenderIp, FilterValue::Ip(v)) => *v == frame.sender_ip,
        (FieldName::TargetMac, FilterValue::Mac(v)) => *v == frame.target_mac,
        (FieldName::TargetIp, FilterValue::Ip(v)) => *v == frame.target_ip,
        _ => false,
    }
}

impl From<&FilterProfile> for FilterSet {
    fn from(profile: &FilterProfile) -> Self {
        let mut set = FilterSet::new();

        if let Some(v) = profile.frame_type {
            set.insert(FieldName::FrameType, FilterValue::Word(v));
        }
        if let Some(v) = profile.hard_type {
            set.insert(FieldName::HwType, FilterValue::Word(v));
        }
        if let Some(v) = profile.prot_type {
            set.insert(FieldName::ProtoType, FilterValue::Word(v));
        }
        if let Some(v) = profile.hard_size {
            set.insert(FieldName::HwSize, FilterValue::Byte(v));
        }
        if let Some(v) = profile.prot_size {
            set.insert(FieldName::ProtoSize, FilterValue::Byte(v));
        }
        if let Some(v) = profile.opcode {
            set.insert(FieldName::Opcode, FilterValue::Word(v));
        }
        if let Some(v) = profile.sender_mac {
            set.insert(FieldName::SenderMac, FilterValue::Mac(v));
        }
        if let Some(v) = profile.sender_ip {
            set.insert(FieldName::SenderIp, FilterValue::Ip(v));
        }
        if let Some(v) = profile.target_mac {
            set.insert(FieldName::TargetMac, FilterValue::Mac(v));
        }
        if let Some(v) = profile.target_ip {
            set.insert(FieldName::TargetIp, FilterValue::Ip(v));
        }

        set
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
