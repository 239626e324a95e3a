// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Command Line Interface Definitions
//!
//! This module defines the strict schema for user input.
//!
//! It serves as the single source of truth for the application's
//! command-line interface. The *execution* logic lives in `main.rs` and
//! `chat.rs`; the *definition* of the flags and help text is centralized
//! here.
//!
//! Two architectural notes:
//!
//! 1.  **Input Normalization**: `clap` validates the flags before anything
//!     runs; a malformed invocation never reaches the privilege gate.
//! 2.  **State Translation**: the `From<&CommandLine> for Config`
//!     implementation decouples the external interface (CLI flags) from the
//!     internal application state (`Config`), so the libraries stay
//!     agnostic of the user interface layer.
//!
//! Exit codes are part of the contract: clean runs end with 0, every init
//! or runtime failure with 1, including bad flags. That is why parsing
//! goes through [`CommandLine::parse_args`] instead of clap's default
//! error path (clap would exit with 2).

use arpchat_common::config::Config;
use clap::Parser;

#[derive(Parser)]
#[command(name = "arpchat")]
#[command(about = "Covert peer-to-peer text chat over forged ARP frames.")]
pub struct CommandLine {
    /// Network interface carrying the channel
    #[arg(short = 'i', long = "iface", value_name = "INTERFACE")]
    pub interface: String,

    /// Path of the frame profile file
    #[arg(
        short = 'f',
        long = "config",
        value_name = "FILE",
        default_value = "./arpchat.toml"
    )]
    pub profile_path: String,

    /// Debugging level: 0 (errors), 1 (standard), 2 (verbose)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value_t = 0)]
    pub debug: u8,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        match Self::try_parse() {
            Ok(commands) => commands,
            Err(e) if e.use_stderr() => {
                let _ = e.print();
                std::process::exit(1);
            }
            // Help and version requests are clean exits.
            Err(e) => e.exit(),
        }
    }
}

impl From<&CommandLine> for Config {
    fn from(cmd: &CommandLine) -> Self {
        Self {
            interface: cmd.interface.clone(),
            profile_path: cmd.profile_path.clone(),
            // Unknown levels fall back to standard debugging.
            verbosity: match cmd.debug {
                level @ 0..=2 => level,
                _ => 1,
            },
            ..Config::default()
        }
    }
}
