// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! # Arpchat CLI Entry Point
//!
//! The binary entry point for arpchat.
//!
//! This module is responsible for bootstrapping the session and managing
//! the global lifecycle of the process. It isolates the command-line
//! interface layer from the core library logic.
//!
//! ## Responsibilities
//!
//! 1.  **Global State Setup**: initializes the `tracing` subscriber, a
//!     verbosity-gated terminal formatter plus the persistent log file.
//! 2.  **Configuration Mapping**: converts raw command-line arguments
//!     (parsed via `clap`) into the internal `Config` struct used by the
//!     libraries.
//! 3.  **Startup Order**: profile → privilege gate → transport (resolver,
//!     template, raw channel) → receiver thread → notifier accept → chat
//!     loop. The gate runs before any socket exists; the raw channel is
//!     opened with nothing but `cap_net_raw` left.
//! 4.  **Error Boundary**: any error propagated up from the session is
//!     caught here, logged to the error stream, and converted into a
//!     non-zero `ExitCode`.

mod chat;
mod commands;
mod terminal;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use arpchat_common::{config::Config, error, info, profile, success};
use arpchat_core::filter::FilterSet;
use arpchat_core::network::notifier::DEFAULT_SOCKET_PATH;
use arpchat_core::privilege;
use arpchat_core::transport::Transport;

use crate::commands::CommandLine;

fn main() -> ExitCode {
    let commands = CommandLine::parse_args();
    let cfg = Config::from(&commands);

    if let Err(e) = terminal::logging::init(cfg.verbosity, &cfg.log_path) {
        eprintln!("cannot initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(&cfg) {
        Ok(()) => {
            success!("clean exit");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Critical failure: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cfg: &Config) -> anyhow::Result<()> {
    let profile = profile::load(Path::new(&cfg.profile_path))?;
    info!(verbosity = 1, "profile loaded from {}", cfg.profile_path);

    privilege::drop_privileges()?;
    info!(verbosity = 1, "privileges reduced to cap_net_raw");

    let filter = FilterSet::from(&profile.filters);
    info!(verbosity = 1, "{} filter rule(s) active", filter.len());

    let mut transport = Transport::open(
        &cfg.interface,
        &profile,
        filter,
        PathBuf::from(DEFAULT_SOCKET_PATH),
    )?;

    let result = chat::run(&mut transport, cfg);
    transport.shutdown();
    result
}
