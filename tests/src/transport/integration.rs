// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

#![cfg(test)]
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use arpchat_common::profile::{FilterProfile, Profile};
use arpchat_core::filter::FilterSet;
use arpchat_core::framer::{self, Reassembler};
use arpchat_core::network::notifier::{NotifierClient, NotifierServer, Wake};
use arpchat_core::network::receiver::{self, Admission};
use arpchat_core::queue::PacketQueue;
use arpchat_protocols::ArpFrame;
use pnet::util::MacAddr;

fn temp_socket(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        ".arpchat-itest-{}-{}.sock",
        tag,
        std::process::id()
    ))
}

fn segment_profile() -> Profile {
    Profile {
        hdr_sender_mac: MacAddr(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0x01),
        hdr_target_mac: MacAddr::broadcast(),
        frame_type: 0x0806,
        opcode: 1,
        target_mac: MacAddr::broadcast(),
        target_ip: Ipv4Addr::new(10, 231, 0, 99),
        sender_ip: Ipv4Addr::new(10, 231, 0, 1),
        filters: FilterProfile::default(),
    }
}

/// The whole unprivileged pipeline in one piece: framer → codec →
/// admission → queue → notifier wake → drain → reassembly.
#[test]
fn pipeline_round_trips_text_without_sockets() {
    const TEXT: &str = "hello, segment";

    let sock = temp_socket("pipeline");
    let server = NotifierServer::bind(&sock).unwrap();
    let queue = Arc::new(PacketQueue::new());

    let producer_queue = Arc::clone(&queue);
    let producer_sock = sock.clone();
    let producer = thread::spawn(move || {
        let mut notifier = NotifierClient::connect(&producer_sock).unwrap();
        let filter = FilterSet::new();
        let mut template = ArpFrame::default();

        for payload in framer::fragments(TEXT) {
            template.set_payload(payload);
            let wire = template.encode().unwrap();
            match receiver::admit(&wire, &filter, &producer_queue).unwrap() {
                Admission::Accepted { depth } => notifier.notify(depth).unwrap(),
                other => panic!("accept-all filter dropped a frame: {other:?}"),
            }
        }
    });

    let mut wake = server.accept(Duration::from_secs(1)).unwrap();
    let mut reassembler = Reassembler::new(80);

    while reassembler.closed_lines().is_empty() {
        match wake.wait() {
            Ok(Wake::Woken) | Ok(Wake::TimedOut) => {
                let pending = queue.len();
                for _ in 0..pending {
                    reassembler.push_fragment(&queue.pop().unwrap().payload());
                }
            }
            Err(_) => break,
        }
    }
    producer.join().unwrap();

    // Anything still queued after the producer hung up.
    while let Ok(frame) = queue.pop() {
        reassembler.push_fragment(&frame.payload());
    }

    assert_eq!(reassembler.closed_lines(), [TEXT]);
}

/// Rule sets act at admission time: only matching frames ever occupy the
/// queue, regardless of arrival order.
#[test]
fn admission_keeps_filtered_frames_out() {
    let queue = PacketQueue::new();
    let filter_profile = FilterProfile {
        opcode: Some(2),
        ..FilterProfile::default()
    };
    let filter = FilterSet::from(&filter_profile);

    for opcode in [1, 2, 1, 2, 1] {
        let frame = ArpFrame {
            opcode,
            ..ArpFrame::default()
        };
        let _ = receiver::admit(&frame.encode().unwrap(), &filter, &queue).unwrap();
    }

    assert_eq!(queue.len(), 2);
    while let Ok(frame) = queue.pop() {
        assert_eq!(frame.opcode, 2);
    }
}

/// Full end-to-end over a real veth pair: one transport forges and sends,
/// the other captures, filters, queues and reassembles.
///
/// Needs root (veth creation and raw sockets); skips gracefully otherwise.
#[test]
#[cfg(target_os = "linux")]
fn veth_end_to_end() {
    use arpchat_core::transport::Transport;

    use crate::utils::VethContext;

    let ctx = match VethContext::new("e2e") {
        Some(c) => c,
        None => {
            eprintln!("Skipping veth test: requires root privileges or the 'ip' command.");
            return;
        }
    };

    // Receiving side first: bind the notifier, then start capturing on
    // the peer end. The filter pins the chat's target address so kernel
    // ARP chatter on the fresh link cannot pollute the stream.
    let sock = temp_socket("veth-rx");
    let server = NotifierServer::bind(&sock).unwrap();

    let filter_profile = FilterProfile {
        frame_type: Some(0x0806),
        target_ip: Some(Ipv4Addr::new(10, 231, 0, 99)),
        ..FilterProfile::default()
    };

    let mut rx_side = match Transport::open(
        &ctx.peer_if,
        &segment_profile(),
        FilterSet::from(&filter_profile),
        sock.clone(),
    ) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Skipping veth test: cannot open raw channel: {e:#}");
            return;
        }
    };
    rx_side.start().unwrap();
    let mut wake = server.accept(Duration::from_secs(3)).unwrap();

    // Sending side: a transport can transmit without ever starting its
    // receiver, so the unused notifier path stays unbound.
    let tx_side = Transport::open(
        &ctx.host_if,
        &segment_profile(),
        FilterSet::new(),
        temp_socket("veth-tx"),
    )
    .unwrap();

    assert_eq!(
        tx_side.template().target_ip,
        Ipv4Addr::new(10, 231, 0, 99),
        "profile must stamp the outgoing template"
    );

    let frames = tx_side.send_text("hi").unwrap();
    assert_eq!(frames, 2, "one content frame plus the sentinel");

    let queue = rx_side.queue();
    let mut reassembler = Reassembler::new(80);
    let deadline = Instant::now() + Duration::from_secs(5);

    while reassembler.closed_lines().is_empty() && Instant::now() < deadline {
        if let Ok(Wake::Woken) = wake.wait() {
            let pending = queue.len();
            for _ in 0..pending {
                reassembler.push_fragment(&queue.pop().unwrap().payload());
            }
        }
    }

    assert_eq!(reassembler.closed_lines(), ["hi"]);

    // Shutdown liveness: the receiver must come home within one receive
    // window plus scheduling slack.
    let start = Instant::now();
    rx_side.shutdown();
    assert!(
        start.elapsed() < Duration::from_secs(4),
        "receiver took {:?} to stop",
        start.elapsed()
    );
}
