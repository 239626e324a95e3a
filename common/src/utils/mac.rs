// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Parsing for the MAC address notation used by frame profiles.
//!
//! The accepted grammar is wider than the canonical `aa:bb:cc:dd:ee:ff`
//! form: six `:`-separated hex groups, each 1 to 4 characters long, an
//! optional `0x` prefix per group, and every group evaluating to at most
//! 255. `pnet`'s own `FromStr` insists on two-digit groups, hence the
//! dedicated parser.

use pnet::util::MacAddr;
use thiserror::Error;

const GROUP_COUNT: usize = 6;
const MAX_GROUP_CHARS: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MacParseError {
    #[error("expected {GROUP_COUNT} ':'-separated groups, found {0}")]
    GroupCount(usize),
    #[error("group '{0}' is empty or longer than {MAX_GROUP_CHARS} characters")]
    GroupLength(String),
    #[error("group '{0}' is not valid hexadecimal")]
    InvalidDigit(String),
    #[error("group '{0}' evaluates above 255")]
    OutOfRange(String),
}

/// Parses MAC text in profile notation into a [`MacAddr`].
pub fn parse_mac(text: &str) -> Result<MacAddr, MacParseError> {
    let groups: Vec<&str> = text.split(':').collect();
    if groups.len() != GROUP_COUNT {
        return Err(MacParseError::GroupCount(groups.len()));
    }

    let mut octets = [0u8; GROUP_COUNT];
    for (idx, group) in groups.iter().enumerate() {
        octets[idx] = parse_group(group)?;
    }

    Ok(MacAddr(
        octets[0], octets[1], octets[2], octets[3], octets[4], octets[5],
    ))
}

fn parse_group(group: &str) -> Result<u8, MacParseError> {
    if group.is_empty() || group.len() > MAX_GROUP_CHARS {
        return Err(MacParseError::GroupLength(group.to_string()));
    }

    let digits = group
        .strip_prefix("0x")
        .or_else(|| group.strip_prefix("0X"))
        .unwrap_or(group);
    if digits.is_empty() {
        return Err(MacParseError::GroupLength(group.to_string()));
    }

    let value = u16::from_str_radix(digits, 16)
        .map_err(|_| MacParseError::InvalidDigit(group.to_string()))?;

    u8::try_from(value).map_err(|_| MacParseError::OutOfRange(group.to_string()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
