// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use arpchat_common::interface::ResolvedInterface;
use colored::*;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;

/// Raw output lane: bypasses the symbol/verbosity formatting and prints
/// the message verbatim. This is how chat lines reach the screen without
/// fighting the log formatter.
#[macro_export]
macro_rules! cprint {
    () => {
        $crate::cprint!("");
    };
    ($($arg:tt)*) => {
        tracing::info!(
            target: "arpchat::print",
            raw_msg = %format_args!($($arg)*)
        );
    };
}

/// The session banner: which link identity this end of the channel uses.
pub fn welcome(local: &ResolvedInterface) {
    let title: String = format!("⟦ ARPCHAT v{} ⟧", env!("CARGO_PKG_VERSION"));
    let sep: ColoredString = "═"
        .repeat(TOTAL_WIDTH.saturating_sub(title.chars().count()) / 2)
        .color(colors::SEPARATOR);
    cprint!("{}{}{}", sep, title.bold().color(colors::PRIMARY), sep);

    cprint!(
        "{} {} ({} / {})",
        "channel on".color(colors::TEXT_DEFAULT),
        local.interface.name.bold(),
        local.mac.to_string().color(colors::MAC_ADDR),
        local.ipv4
    );
    cprint!(
        "{}",
        "type a line to broadcast it, '/quit' to leave".color(colors::TEXT_DEFAULT)
    );
}

/// A message we sent, echoed into our own history.
pub fn own_line(text: &str) {
    cprint!(
        "{} {}",
        ">>>".bold().color(colors::PRIMARY),
        text.color(colors::TEXT_DEFAULT)
    );
}

/// A completed line received from the channel.
pub fn peer_line(text: &str) {
    cprint!(
        "{} {}",
        "<<<".bold().color(colors::SECONDARY),
        text.color(colors::TEXT_DEFAULT)
    );
}
