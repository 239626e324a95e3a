// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Privilege reduction at startup.
//!
//! The binary is meant to be launched by an ordinary user with the
//! `cap_net_raw` file capability, never as root and never setuid-root.
//! [`drop_privileges`] enforces that and then shrinks the process
//! capability sets to exactly the raw-network capability before any socket
//! is opened:
//!
//! 1. refuse to run when any real or effective uid/gid is 0;
//! 2. `prctl(PR_SET_KEEPCAPS)` so the permitted set survives step 3;
//! 3. pin all three gids, then all three uids, to the real ids;
//! 4. reduce permitted and effective to `CAP_NET_RAW`, clear inheritable.
//!
//! Any failure is fatal to initialization.

use caps::{CapSet, Capability};
use is_root::is_root;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrivilegeError {
    #[error("root user or group is not permitted: run as a standard user with the cap_net_raw file capability")]
    RootUser,
    #[error("prctl(PR_SET_KEEPCAPS) failed: {0}")]
    KeepCaps(std::io::Error),
    #[error("setresgid failed: {0}")]
    SetGid(std::io::Error),
    #[error("setresuid failed: {0}")]
    SetUid(std::io::Error),
    #[error("capability reduction failed: {0}")]
    CapDrop(#[from] caps::errors::CapsError),
}

/// The four ids the root refusal is decided on.
#[derive(Debug, Clone, Copy)]
pub struct ProcessIds {
    pub uid: libc::uid_t,
    pub euid: libc::uid_t,
    pub gid: libc::gid_t,
    pub egid: libc::gid_t,
}

impl ProcessIds {
    pub fn current() -> Self {
        // The id getters cannot fail.
        unsafe {
            Self {
                uid: libc::getuid(),
                euid: libc::geteuid(),
                gid: libc::getgid(),
                egid: libc::getegid(),
            }
        }
    }
}

/// Refuses any process that is root by user or by group.
pub fn ensure_unprivileged(ids: &ProcessIds) -> Result<(), PrivilegeError> {
    if ids.uid == 0 || ids.euid == 0 || ids.gid == 0 || ids.egid == 0 {
        return Err(PrivilegeError::RootUser);
    }
    Ok(())
}

/// Reduces the process to an unprivileged user holding only `CAP_NET_RAW`.
pub fn drop_privileges() -> Result<(), PrivilegeError> {
    if is_root() {
        return Err(PrivilegeError::RootUser);
    }

    let ids = ProcessIds::current();
    ensure_unprivileged(&ids)?;

    if unsafe { libc::prctl(libc::PR_SET_KEEPCAPS, 1 as libc::c_ulong) } == -1 {
        return Err(PrivilegeError::KeepCaps(std::io::Error::last_os_error()));
    }
    if unsafe { libc::setresgid(ids.gid, ids.gid, ids.gid) } == -1 {
        return Err(PrivilegeError::SetGid(std::io::Error::last_os_error()));
    }
    if unsafe { libc::setresuid(ids.uid, ids.uid, ids.uid) } == -1 {
        return Err(PrivilegeError::SetUid(std::io::Error::last_os_error()));
    }

    let keep: HashSet<Capability> = HashSet::from([Capability::CAP_NET_RAW]);
    caps::set(None, CapSet::Permitted, &keep)?;
    caps::set(None, CapSet::Effective, &keep)?;
    caps::set(None, CapSet::Inheritable, &HashSet::new())?;

    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
