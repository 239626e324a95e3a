// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};
use pnet::util::MacAddr;
use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// No interface with the requested name exists on this host.
    #[error("no interface named '{0}'")]
    UnknownInterface(String),
    /// The interface exists but carries no hardware address.
    #[error("interface '{0}' has no MAC address")]
    NoMacAddress(String),
    /// The interface exists but has no IPv4 address bound.
    #[error("interface '{0}' has no IPv4 address bound")]
    NoAddress(String),
}

/// Link-layer identity of a named interface.
///
/// The resolved MAC and IPv4 address seed the outgoing frame template;
/// the interface itself is what the raw channel binds to.
#[derive(Debug, Clone)]
pub struct ResolvedInterface {
    pub interface: NetworkInterface,
    pub index: u32,
    pub mac: MacAddr,
    pub ipv4: Ipv4Addr,
}

/// Looks up a named interface and extracts its index, MAC and first IPv4.
pub fn resolve(name: &str) -> Result<ResolvedInterface, ResolveError> {
    let interface: NetworkInterface = datalink::interfaces()
        .into_iter()
        .find(|intf| intf.name == name)
        .ok_or_else(|| ResolveError::UnknownInterface(name.to_string()))?;

    resolve_from(interface)
}

fn resolve_from(interface: NetworkInterface) -> Result<ResolvedInterface, ResolveError> {
    let mac: MacAddr = interface
        .mac
        .ok_or_else(|| ResolveError::NoMacAddress(interface.name.clone()))?;

    let ipv4: Ipv4Addr = interface
        .get_ipv4_nets()
        .first()
        .map(|net| net.ip())
        .ok_or_else(|| ResolveError::NoAddress(interface.name.clone()))?;

    Ok(ResolvedInterface {
        index: interface.index,
        mac,
        ipv4,
        interface,
    })
}

pub trait NetworkInterfaceExtension {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network>;
}

impl NetworkInterfaceExtension for NetworkInterface {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network> {
        self.ips
            .iter()
            .filter_map(|ip| {
                if let IpNetwork::V4(ipv4) = ip {
                    Some(*ipv4)
                } else {
                    None
                }
            })
            .collect()
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

    fn create_mock_interface(
        name: &str,
        mac: Option<MacAddr>,
        ips: Vec<IpNetwork>,
    ) -> NetworkInterface {
        NetworkInterface {
            name: name.to_string(),
            description: "An interface".to_string(),
            index: 3,
            mac,
            ips,
            flags: 0,
        }
    }

    fn default_mac() -> Option<MacAddr> {
        Some(MacAddr(0x1, 0x2, 0x3, 0x4, 0x5, 0x6))
    }

    fn default_ips() -> Vec<IpNetwork> {
        vec![IpNetwork::V4("192.168.1.100".parse().unwrap())]
    }

    #[test]
    fn resolve_from_should_succeed() {
        let interface = create_mock_interface("eth0", default_mac(), default_ips());
        let resolved = resolve_from(interface).expect("viable interface should resolve");

        assert_eq!(resolved.index, 3);
        assert_eq!(resolved.mac, MacAddr(0x1, 0x2, 0x3, 0x4, 0x5, 0x6));
        assert_eq!(resolved.ipv4, Ipv4Addr::new(192, 168, 1, 100));
    }

    #[test]
    fn resolve_from_should_fail_no_mac() {
        let interface = create_mock_interface("eth0", None, default_ips());
        let result = resolve_from(interface);
        assert_eq!(result.unwrap_err(), ResolveError::NoMacAddress("eth0".into()));
    }

    #[test]
    fn resolve_from_should_fail_no_ipv4() {
        let ipv6_only = vec![IpNetwork::V6("fe80::1234:5678:abcd:ef01".parse().unwrap())];
        let interface = create_mock_interface("wlan0", default_mac(), ipv6_only);
        let result = resolve_from(interface);
        assert_eq!(result.unwrap_err(), ResolveError::NoAddress("wlan0".into()));
    }

    #[test]
    fn resolve_should_fail_unknown_name() {
        let result = resolve("surely-not-a-real-interface-name");
        assert!(matches!(result, Err(ResolveError::UnknownInterface(_))));
    }

    #[test]
    fn first_ipv4_net_wins() {
        let ips = vec![
            IpNetwork::V6("2001:db8::1".parse().unwrap()),
            IpNetwork::V4("10.0.0.7".parse().unwrap()),
            IpNetwork::V4("172.16.0.1".parse().unwrap()),
        ];
        let interface = create_mock_interface("eth1", default_mac(), ips);
        let resolved = resolve_from(interface).unwrap();
        assert_eq!(resolved.ipv4, Ipv4Addr::new(10, 0, 0, 7));
    }
}
