// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! Lifecycle of the chat channel.
//!
//! A [`Transport`] ties the pieces together: it resolves the interface,
//! stamps the outgoing frame template, opens the raw channel, runs the
//! receiver thread and owns the shared shutdown flag. Construction order
//! matters and is fixed: resolve → template → channel → receiver; the
//! privilege gate must already have run before [`Transport::open`] is
//! called, and the notifier server must be bound before
//! [`Transport::start`] so the receiver's connect retries can succeed.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use anyhow::Context;
use arpchat_common::interface::{self, ResolvedInterface};
use arpchat_common::profile::Profile;
use arpchat_common::{debug, error, info};
use arpchat_protocols::ArpFrame;
use pnet::datalink::{DataLinkReceiver, DataLinkSender};

use crate::filter::FilterSet;
use crate::framer;
use crate::network::channel;
use crate::network::receiver;
use crate::queue::PacketQueue;

pub struct Transport {
    template: Mutex<ArpFrame>,
    tx: Mutex<Box<dyn DataLinkSender>>,
    rx: Option<Box<dyn DataLinkReceiver>>,
    filter: FilterSet,
    queue: Arc<PacketQueue>,
    running: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
    notifier_path: PathBuf,
    local: ResolvedInterface,
}

impl Transport {
    /// Resolves the interface, builds the frame template and opens the raw
    /// channel. Nothing is received until [`Transport::start`].
    pub fn open(
        iface: &str,
        profile: &Profile,
        filter: FilterSet,
        notifier_path: PathBuf,
    ) -> anyhow::Result<Self> {
        let local = interface::resolve(iface)
            .with_context(|| format!("resolving interface '{iface}'"))?;
        info!(
            verbosity = 1,
            "using {} (index {}, {} / {})", local.interface.name, local.index, local.mac, local.ipv4
        );

        let template = build_template(&local, profile);
        debug!(
            verbosity = 2,
            "frame template: src {} dst {} type {:#06x} opcode {}",
            template.eth_src_mac,
            template.eth_dst_mac,
            template.frame_type,
            template.opcode
        );

        let (tx, rx) = channel::open_raw_channel(&local.interface)?;

        Ok(Self {
            template: Mutex::new(template),
            tx: Mutex::new(tx),
            rx: Some(rx),
            filter,
            queue: Arc::new(PacketQueue::new()),
            running: Arc::new(AtomicBool::new(true)),
            reader: None,
            notifier_path,
            local,
        })
    }

    /// Spawns the receiver thread. Call once, after the notifier server is
    /// listening.
    pub fn start(&mut self) -> anyhow::Result<()> {
        let rx = self.rx.take().context("receiver already started")?;
        self.reader = Some(receiver::spawn(
            rx,
            Arc::clone(&self.queue),
            self.filter.clone(),
            Arc::clone(&self.running),
            self.notifier_path.clone(),
        ));
        Ok(())
    }

    /// Fragments a message and broadcasts it, one frame per fragment plus
    /// the closing sentinel. Returns the number of frames sent.
    pub fn send_text(&self, text: &str) -> anyhow::Result<usize> {
        let mut template = self.template.lock().unwrap();
        let mut tx = self.tx.lock().unwrap();

        let mut frames = 0usize;
        for payload in framer::fragments(text) {
            template.set_payload(payload);
            let wire = template.encode()?;
            let written = channel::send_frame(tx.as_mut(), &wire)?;
            debug!(verbosity = 2, "sent frame {frames}: {written} octets");
            frames += 1;
        }

        Ok(frames)
    }

    /// Signals every thread to stop and joins the receiver. Idempotent.
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(reader) = self.reader.take()
            && reader.join().is_err()
        {
            error!("receiver thread panicked during shutdown");
        }
    }

    pub fn queue(&self) -> Arc<PacketQueue> {
        Arc::clone(&self.queue)
    }

    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn template(&self) -> ArpFrame {
        *self.template.lock().unwrap()
    }

    pub fn local(&self) -> &ResolvedInterface {
        &self.local
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Stamps the outgoing template in three layers: protocol defaults, then
/// the resolved link-layer identity, then the profile overrides. The
/// payload carrier keeps the local MAC until the first fragment replaces
/// it.
fn build_template(local: &ResolvedInterface, profile: &Profile) -> ArpFrame {
    let mut template = ArpFrame::default();
    seed_from_interface(&mut template, local);
    apply_profile(&mut template, profile);
    template
}

fn seed_from_interface(template: &mut ArpFrame, local: &ResolvedInterface) {
    template.eth_src_mac = local.mac;
    template.sender_mac = local.mac;
    template.sender_ip = local.ipv4;
}

fn apply_profile(template: &mut ArpFrame, profile: &Profile) {
    template.eth_src_mac = profile.hdr_sender_mac;
    template.eth_dst_mac = profile.hdr_target_mac;
    template.frame_type = profile.frame_type;
    template.opcode = profile.opcode;
    template.target_mac = profile.target_mac;
    template.target_ip = profile.target_ip;
    template.sender_ip = profile.sender_ip;
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use arpchat_common::profile::FilterProfile;
    use pnet::datalink::NetworkInterface;
    use pnet::util::MacAddr;
    use std::net::Ipv4Addr;

    fn resolved() -> ResolvedInterface {
        ResolvedInterface {
            interface: NetworkInterface {
                name: "eth0".to_string(),
                description: String::new(),
                index: 2,
                mac: Some(MacAddr(0x02, 0x00, 0x00, 0x00, 0x00, 0x01)),
                ips: vec![],
                flags: 0,
            },
            index: 2,
            mac: MacAddr(0x02, 0x00, 0x00, 0x00, 0x00, 0x01),
            ipv4: Ipv4Addr::new(192, 168, 1, 23),
        }
    }

    fn profile() -> Profile {
        Profile {
            hdr_sender_mac: MacAddr(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0x01),
            hdr_target_mac: MacAddr::broadcast(),
            frame_type: 0x0806,
            opcode: 1,
            target_mac: MacAddr::broadcast(),
            target_ip: Ipv4Addr::new(192, 168, 1, 255),
            sender_ip: Ipv4Addr::new(10, 9, 8, 7),
            filters: FilterProfile::default(),
        }
    }

    #[test]
    fn template_layers_resolver_under_profile() {
        let template = build_template(&resolved(), &profile());

        // The payload carrier starts as the local MAC; the profile does
        // not touch it.
        assert_eq!(template.sender_mac, MacAddr(0x02, 0x00, 0x00, 0x00, 0x00, 0x01));
        // The profile wins on everything it names.
        assert_eq!(template.eth_src_mac, MacAddr(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0x01));
        assert_eq!(template.eth_dst_mac, MacAddr::broadcast());
        assert_eq!(template.sender_ip, Ipv4Addr::new(10, 9, 8, 7));
        assert_eq!(template.target_ip, Ipv4Addr::new(192, 168, 1, 255));
        // Protocol constants stay at their defaults.
        assert_eq!(template.hw_type, 1);
        assert_eq!(template.proto_type, 0x0800);
        assert_eq!(template.hw_size, 6);
        assert_eq!(template.proto_size, 4);
    }
}
