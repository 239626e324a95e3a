// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! The 42-octet ARP-over-Ethernet frame that carries the chat channel.
//!
//! Every field of the ARP body plus the Ethernet header is exposed as a
//! host-order value on [`ArpFrame`]; byte-order conversion happens only at
//! the encode/decode boundary. The `sender_mac` field is special: on this
//! channel it carries up to [`PAYLOAD_LEN`] octets of message data instead
//! of a hardware address.

use anyhow::Context;
use pnet::packet::Packet;
use pnet::packet::arp::{ArpHardwareType, ArpOperation, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherType, EthernetPacket, MutableEthernetPacket};
use pnet::util::MacAddr;
use std::net::Ipv4Addr;
use thiserror::Error;

use crate::utils::{ARP_LEN, ETH_HDR_LEN};

/// Exact on-wire size of one chat frame. Never padded, never extended.
pub const FRAME_LEN: usize = ETH_HDR_LEN + ARP_LEN;

/// Message octets carried per frame, in the sender-hardware-address field.
pub const PAYLOAD_LEN: usize = 6;

pub const ETHERTYPE_ARP: u16 = 0x0806;
pub const HW_TYPE_ETHERNET: u16 = 1;
pub const PROTO_TYPE_IPV4: u16 = 0x0800;
pub const OPCODE_REQUEST: u16 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("frame too short: {0} of {FRAME_LEN} octets")]
    Truncated(usize),
}

/// Host-order view of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpFrame {
    pub eth_dst_mac: MacAddr,
    pub eth_src_mac: MacAddr,
    pub frame_type: u16,
    pub hw_type: u16,
    pub proto_type: u16,
    pub hw_size: u8,
    pub proto_size: u8,
    pub opcode: u16,
    /// Payload carrier. Holds message octets, not a hardware address.
    pub sender_mac: MacAddr,
    pub sender_ip: Ipv4Addr,
    pub target_mac: MacAddr,
    pub target_ip: Ipv4Addr,
}

impl Default for ArpFrame {
    /// Protocol constants of an ordinary ARP request, addresses zeroed.
    fn default() -> Self {
        Self {
            eth_dst_mac: MacAddr::zero(),
            eth_src_mac: MacAddr::zero(),
            frame_type: ETHERTYPE_ARP,
            hw_type: HW_TYPE_ETHERNET,
            proto_type: PROTO_TYPE_IPV4,
            hw_size: 6,
            proto_size: 4,
            opcode: OPCODE_REQUEST,
            sender_mac: MacAddr::zero(),
            sender_ip: Ipv4Addr::UNSPECIFIED,
            target_mac: MacAddr::zero(),
            target_ip: Ipv4Addr::LOCALHOST,
        }
    }
}

impl ArpFrame {
    /// Serializes into the exact wire image.
    pub fn encode(&self) -> anyhow::Result<[u8; FRAME_LEN]> {
        let mut buffer = [0u8; FRAME_LEN];
        {
            let mut eth: MutableEthernetPacket =
                MutableEthernetPacket::new(&mut buffer[..ETH_HDR_LEN])
                    .context("failed to create mutable Ethernet packet")?;
            eth.set_destination(self.eth_dst_mac);
            eth.set_source(self.eth_src_mac);
            eth.set_ethertype(EtherType::new(self.frame_type));
        }
        {
            let mut arp: MutableArpPacket = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..])
                .context("failed to create mutable ARP packet")?;
            arp.set_hardware_type(ArpHardwareType::new(self.hw_type));
            arp.set_protocol_type(EtherType::new(self.proto_type));
            arp.set_hw_addr_len(self.hw_size);
            arp.set_proto_addr_len(self.proto_size);
            arp.set_operation(ArpOperation::new(self.opcode));
            arp.set_sender_hw_addr(self.sender_mac);
            arp.set_sender_proto_addr(self.sender_ip);
            arp.set_target_hw_addr(self.target_mac);
            arp.set_target_proto_addr(self.target_ip);
        }
        Ok(buffer)
    }

    /// Parses a received frame back into the host-order view.
    ///
    /// Anything shorter than [`FRAME_LEN`] is rejected; trailing octets
    /// beyond the 42nd (e.g. kernel padding on ingress) are ignored.
    pub fn decode(buffer: &[u8]) -> Result<Self, DecodeError> {
        if buffer.len() < FRAME_LEN {
            return Err(DecodeError::Truncated(buffer.len()));
        }

        let eth: EthernetPacket = EthernetPacket::new(&buffer[..FRAME_LEN])
            .ok_or(DecodeError::Truncated(buffer.len()))?;
        let arp: ArpPacket =
            ArpPacket::new(eth.payload()).ok_or(DecodeError::Truncated(buffer.len()))?;

        Ok(Self {
            eth_dst_mac: eth.get_destination(),
            eth_src_mac: eth.get_source(),
            frame_type: eth.get_ethertype().0,
            hw_type: arp.get_hardware_type().0,
            proto_type: arp.get_protocol_type().0,
            hw_size: arp.get_hw_addr_len(),
            proto_size: arp.get_proto_addr_len(),
            opcode: arp.get_operation().0,
            sender_mac: arp.get_sender_hw_addr(),
            sender_ip: arp.get_sender_proto_addr(),
            target_mac: arp.get_target_hw_addr(),
            target_ip: arp.get_target_proto_addr(),
        })
    }

    /// Places message octets into the payload carrier field.
    pub fn set_payload(&mut self, payload: [u8; PAYLOAD_LEN]) {
        self.sender_mac = MacAddr(
            payload[0], payload[1], payload[2], payload[3], payload[4], payload[5],
        );
    }

    /// Message octets carried by this frame.
    pub fn payload(&self) -> [u8; PAYLOAD_LEN] {
        self.sender_mac.octets()
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

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> ArpFrame {
        ArpFrame {
            eth_dst_mac: MacAddr::broadcast(),
            eth_src_mac: MacAddr(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0x01),
            frame_type: 0x0806,
            hw_type: 1,
            proto_type: 0x0800,
            hw_size: 6,
            proto_size: 4,
            opcode: 2,
            sender_mac: MacAddr(0x68, 0x69, 0x00, 0x00, 0x00, 0x00),
            sender_ip: Ipv4Addr::new(192, 168, 1, 23),
            target_mac: MacAddr::broadcast(),
            target_ip: Ipv4Addr::new(192, 168, 1, 255),
        }
    }

    #[test]
    fn encode_is_exactly_42_octets() {
        let buffer = sample_frame().encode().unwrap();
        assert_eq!(buffer.len(), FRAME_LEN);
        assert_eq!(FRAME_LEN, 42);
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let frame = sample_frame();
        let decoded = ArpFrame::decode(&frame.encode().unwrap()).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn two_octet_fields_are_big_endian() {
        let buffer = sample_frame().encode().unwrap();

        // frame_type 0x0806 at offsets 12..13
        assert_eq!(&buffer[12..14], &[0x08, 0x06]);
        // hw_type 1 at offsets 14..15
        assert_eq!(&buffer[14..16], &[0x00, 0x01]);
        // proto_type 0x0800 at offsets 16..17
        assert_eq!(&buffer[16..18], &[0x08, 0x00]);
        // opcode 2 at offsets 20..21
        assert_eq!(&buffer[20..22], &[0x00, 0x02]);
    }

    #[test]
    fn field_offsets_match_the_wire_layout() {
        let frame = sample_frame();
        let buffer = frame.encode().unwrap();

        assert_eq!(&buffer[0..6], &frame.eth_dst_mac.octets());
        assert_eq!(&buffer[6..12], &frame.eth_src_mac.octets());
        assert_eq!(buffer[18], 6);
        assert_eq!(buffer[19], 4);
        assert_eq!(&buffer[22..28], &frame.sender_mac.octets());
        assert_eq!(&buffer[28..32], &frame.sender_ip.octets());
        assert_eq!(&buffer[32..38], &frame.target_mac.octets());
        assert_eq!(&buffer[38..42], &frame.target_ip.octets());
    }

    #[test]
    fn decode_rejects_short_buffer() {
        let buffer = sample_frame().encode().unwrap();
        let result = ArpFrame::decode(&buffer[..FRAME_LEN - 1]);
        assert_eq!(result.unwrap_err(), DecodeError::Truncated(41));
    }

    #[test]
    fn decode_ignores_trailing_padding() {
        let frame = sample_frame();
        let mut padded = frame.encode().unwrap().to_vec();
        padded.resize(60, 0);
        assert_eq!(ArpFrame::decode(&padded).unwrap(), frame);
    }

    #[test]
    fn payload_round_trips_through_the_carrier_field() {
        let mut frame = ArpFrame::default();
        frame.set_payload([0x41, 0x42, 0x43, 0x00, 0x00, 0x00]);
        assert_eq!(frame.payload(), [0x41, 0x42, 0x43, 0x00, 0x00, 0x00]);
        assert_eq!(frame.sender_mac, MacAddr(0x41, 0x42, 0x43, 0x00, 0x00, 0x00));
    }

    #[test]
    fn nonstandard_field_values_survive_the_codec() {
        // The template permits arbitrary two-octet values; the codec must
        // not normalize them back to protocol constants.
        let mut frame = sample_frame();
        frame.frame_type = 0x88b5;
        frame.hw_type = 6;
        frame.opcode = 9;

        let decoded = ArpFrame::decode(&frame.encode().unwrap()).unwrap();
        assert_eq!(decoded.frame_type, 0x88b5);
        assert_eq!(decoded.hw_type, 6);
        assert_eq!(decoded.opcode, 9);
    }
}
