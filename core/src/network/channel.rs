// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use anyhow::{self, Context};
use pnet::datalink;
use pnet::datalink::{Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};
use std::time::Duration;

/// Upper bound on one blocking wait for frames. Shutdown latency and the
/// receiver's "nothing arrived" log cadence are both tied to it.
pub const READ_TIMEOUT: Duration = Duration::from_secs(3);

/// Opens the link-layer channel the chat runs on.
///
/// The channel captures every Ethernet frame on the interface and accepts
/// outgoing frames with arbitrary source addresses, which is the whole
/// point: the payload travels in a forged sender hardware address.
/// Requires `cap_net_raw`; an unprivileged caller gets the kernel's
/// permission error wrapped with the interface name.
pub fn open_raw_channel(
    intf: &NetworkInterface,
) -> anyhow::Result<(Box<dyn DataLinkSender>, Box<dyn DataLinkReceiver>)> {
    let cfg = Config {
        read_timeout: Some(READ_TIMEOUT),
        ..Default::default()
    };
    open_with(intf, datalink::channel, cfg)
}

pub fn open_with<F>(
    intf: &NetworkInterface,
    channel_opener: F,
    cfg: Config,
) -> anyhow::Result<(Box<dyn DataLinkSender>, Box<dyn DataLinkReceiver>)>
where
    F: FnOnce(&NetworkInterface, Config) -> std::io::Result<datalink::Channel>,
{
    let ch: Channel =
        channel_opener(intf, cfg).with_context(|| format!("opening on {}", intf.name))?;

    match ch {
        Channel::Ethernet(tx, rx) => Ok((tx, rx)),
        _ => anyhow::bail!("non-ethernet channel for {}", intf.name),
    }
}

/// Hands one wire image to the kernel; returns the octet count written.
pub fn send_frame(tx: &mut dyn DataLinkSender, frame: &[u8]) -> anyhow::Result<usize> {
    match tx.send_to(frame, None) {
        Some(Ok(())) => Ok(frame.len()),
        Some(Err(e)) => Err(e).context("send rejected by kernel"),
        None => anyhow::bail!("link-layer channel is closed"),
    }
}
