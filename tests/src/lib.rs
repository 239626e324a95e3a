// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

mod transport;

#[cfg(target_os = "linux")]
pub mod utils {
    use std::process::Command;
    use std::thread;
    use std::time::Duration;

    /// RAII wrapper for a veth pair acting as a private broadcast segment.
    ///
    /// Both ends live in the default namespace with addresses in
    /// 10.231.0.0/24, so two transports on the two ends see each other's
    /// frames like two hosts on one wire.
    pub struct VethContext {
        pub host_if: String,
        pub peer_if: String,
    }

    impl VethContext {
        pub fn new(suffix: &str) -> Option<Self> {
            // Interface names are capped at 15 chars; keep suffixes short.
            let host_if = format!("v-chat-h-{}", suffix);
            let peer_if = format!("v-chat-p-{}", suffix);

            Self::cleanup(&host_if);

            if !run_cmd(
                "ip",
                &[
                    "link", "add", &host_if, "type", "veth", "peer", "name", &peer_if,
                ],
            ) {
                return None;
            }

            run_cmd("ip", &["addr", "add", "10.231.0.1/24", "dev", &host_if]);
            run_cmd("ip", &["addr", "add", "10.231.0.2/24", "dev", &peer_if]);
            run_cmd("ip", &["link", "set", &host_if, "up"]);
            run_cmd("ip", &["link", "set", &peer_if, "up"]);

            thread::sleep(Duration::from_millis(500));

            Some(Self { host_if, peer_if })
        }

        fn cleanup(host_if: &str) {
            // Deleting one end of a veth pair removes both.
            let _ = Command::new("ip").args(["link", "del", host_if]).output();
        }
    }

    impl Drop for VethContext {
        fn drop(&mut self) {
            Self::cleanup(&self.host_if);
        }
    }

    fn run_cmd(cmd: &str, args: &[&str]) -> bool {
        let status = Command::new(cmd).args(args).status();
        match status {
            Ok(s) => s.success(),
            Err(_) => false,
        }
    }
}
