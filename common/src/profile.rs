// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Frame Profile Loader
//!
//! The profile file is the single source of the outgoing frame template and
//! of the optional receive filter rules. It is a TOML document whose key
//! names are fixed (`hdrSenderMAC`, `targetIp`, `opcodeFilter`, ...); the
//! seven header keys are mandatory, the ten `*Filter` keys are optional.
//!
//! Loading happens in two stages:
//!
//! 1. **Deserialization**: `serde` maps the document onto [`RawProfile`],
//!    rejecting unknown keys and mistyped values.
//! 2. **Normalization**: MAC text goes through the profile grammar parser
//!    ([`crate::utils::mac::parse_mac`]), IPv4 text through the standard
//!    library parser, producing the typed [`Profile`].
//!
//! Any failure in either stage is fatal to initialization; there is no
//! partial profile.

use crate::utils::mac::{self, MacParseError};
use pnet::util::MacAddr;
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("cannot read profile '{path}': {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },
    #[error("profile is not valid TOML: {0}")]
    Malformed(#[from] toml::de::Error),
    #[error("key '{key}': {source}")]
    BadMac {
        key: &'static str,
        source: MacParseError,
    },
    #[error("key '{key}': '{text}' is not a valid IPv4 address")]
    BadIp { key: &'static str, text: String },
}

/// The profile document as written, before any value normalization.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProfile {
    #[serde(rename = "hdrSenderMAC")]
    hdr_sender_mac: String,
    #[serde(rename = "hdrTargetMAC")]
    hdr_target_mac: String,
    #[serde(rename = "frameType")]
    frame_type: u16,
    opcode: u16,
    #[serde(rename = "targetMAC")]
    target_mac: String,
    #[serde(rename = "targetIp")]
    target_ip: String,
    #[serde(rename = "senderIp")]
    sender_ip: String,

    #[serde(rename = "frameTypeFilter")]
    frame_type_filter: Option<u16>,
    #[serde(rename = "hardTypeFilter")]
    hard_type_filter: Option<u16>,
    #[serde(rename = "protTypeFilter")]
    prot_type_filter: Option<u16>,
    #[serde(rename = "hardSizeFilter")]
    hard_size_filter: Option<u8>,
    #[serde(rename = "protSizeFilter")]
    prot_size_filter: Option<u8>,
    #[serde(rename = "opcodeFilter")]
    opcode_filter: Option<u16>,
    #[serde(rename = "senderMACFilter")]
    sender_mac_filter: Option<String>,
    #[serde(rename = "senderIpFilter")]
    sender_ip_filter: Option<String>,
    #[serde(rename = "targetMACFilter")]
    target_mac_filter: Option<String>,
    #[serde(rename = "targetIpFilter")]
    target_ip_filter: Option<String>,
}

/// Typed view of the profile, ready to stamp the frame template.
#[derive(Debug, Clone)]
pub struct Profile {
    pub hdr_sender_mac: MacAddr,
    pub hdr_target_mac: MacAddr,
    pub frame_type: u16,
    pub opcode: u16,
    pub target_mac: MacAddr,
    pub target_ip: Ipv4Addr,
    pub sender_ip: Ipv4Addr,
    pub filters: FilterProfile,
}

/// The optional receive filter rules, one field per profile key.
///
/// `None` means the rule is absent and the matching frame field is not
/// inspected.
#[derive(Debug, Clone, Default)]
pub struct FilterProfile {
    pub frame_type: Option<u16>,
    pub hard_type: Option<u16>,
    pub prot_type: Option<u16>,
    pub hard_size: Option<u8>,
    pub prot_size: Option<u8>,
    pub opcode: Option<u16>,
    pub sender_mac: Option<MacAddr>,
    pub sender_ip: Option<Ipv4Addr>,
    pub target_mac: Option<MacAddr>,
    pub target_ip: Option<Ipv4Addr>,
}

pub fn load(path: &Path) -> Result<Profile, ProfileError> {
    let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;
    parse(&text)
}

fn parse(text: &str) -> Result<Profile, ProfileError> {
    let raw: RawProfile = toml::from_str(text)?;

    Ok(Profile {
        hdr_sender_mac: parse_mac_key("hdrSenderMAC", &raw.hdr_sender_mac)?,
        hdr_target_mac: parse_mac_key("hdrTargetMAC", &raw.hdr_target_mac)?,
        frame_type: raw.frame_type,
        opcode: raw.opcode,
        target_mac: parse_mac_key("targetMAC", &raw.target_mac)?,
        target_ip: parse_ip_key("targetIp", &raw.target_ip)?,
        sender_ip: parse_ip_key("senderIp", &raw.sender_ip)?,
        filters: FilterProfile {
            frame_type: raw.frame_type_filter,
            hard_type: raw.hard_type_filter,
            prot_type: raw.prot_type_filter,
            hard_size: raw.hard_size_filter,
            prot_size: raw.prot_size_filter,
            opcode: raw.opcode_filter,
            sender_mac: opt_mac_key("senderMACFilter", raw.sender_mac_filter.as_deref())?,
            sender_ip: opt_ip_key("senderIpFilter", raw.sender_ip_filter.as_deref())?,
            target_mac: opt_mac_key("targetMACFilter", raw.target_mac_filter.as_deref())?,
            target_ip: opt_ip_key("targetIpFilter", raw.target_ip_filter.as_deref())?,
        },
    })
}

fn parse_mac_key(key: &'static str, text: &str) -> Result<MacAddr, ProfileError> {
    mac::parse_mac(text).map_err(|source| ProfileError::BadMac { key, source })
}

fn parse_ip_key(key: &'static str, text: &str) -> Result<Ipv4Addr, ProfileError> {
    text.parse().map_err(|_| ProfileError::BadIp {
        key,
        text: text.to_string(),
    })
}

fn opt_mac_key(key: &'static str, text: Option<&str>) -> Result<Option<MacAddr>, ProfileError> {
    text.map(|t| parse_mac_key(key, t)).transpose()
}

fn opt_ip_key(key: &'static str, text: Option<&str>) -> Result<Option<Ipv4Addr>, ProfileError> {
    text.map(|t| parse_ip_key(key, t)).transpose()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
