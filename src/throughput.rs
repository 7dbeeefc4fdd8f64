// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Target throughput and part size negotiation.
//!
//! Precedence, highest first: an explicit positive `max_bandwidth`, the
//! platform-recommended link speed, then a fixed 10 Gb/s default.

use crate::config::TransferConfig;
use log::debug;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::Networks;

const BITS_PER_BYTE: f64 = 8.0;
const BITS_PER_GIGABIT: f64 = 1_000_000_000.0;
const MEGABITS_PER_GIGABIT: f64 = 1_000.0;
const SYSFS_NET_ROOT: &str = "/sys/class/net";
const LOOPBACK_PREFIX: &str = "lo";

pub const DEFAULT_TARGET_THROUGHPUT_GBPS: f64 = 10.0;
/// `10_000_000_000 / 8` bytes per second.
pub const DEFAULT_TARGET_THROUGHPUT_BYTES_PER_SEC: u64 = 1_250_000_000;

/// Where the negotiated throughput came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThroughputSource {
    Configured,
    Recommended,
    Default,
}

impl fmt::Display for ThroughputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ThroughputSource::Configured => "configured max_bandwidth",
            ThroughputSource::Recommended => "platform recommendation",
            ThroughputSource::Default => "built-in default",
        };
        f.write_str(label)
    }
}

/// Parameters actually handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedParameters {
    pub target_throughput_bytes_per_sec: u64,
    /// `None` lets the engine pick its own part size.
    pub part_size: Option<u64>,
    pub source: ThroughputSource,
}

pub fn negotiate(
    config: &TransferConfig,
    recommended_gbps: Option<f64>,
) -> NegotiatedParameters {
    let (target_throughput_bytes_per_sec, source) = match positive(config.max_bandwidth) {
        Some(configured) => (configured, ThroughputSource::Configured),
        None => match recommended_gbps.filter(|gbps| gbps.is_finite() && *gbps > 0.0) {
            Some(gbps) => (gbps_to_bytes_per_sec(gbps), ThroughputSource::Recommended),
            None => (
                DEFAULT_TARGET_THROUGHPUT_BYTES_PER_SEC,
                ThroughputSource::Default,
            ),
        },
    };

    let part_size = positive(config.multipart_chunksize);

    debug!(
        "Negotiated target throughput {target_throughput_bytes_per_sec} B/s from {source}, part \
         size {part_size:?}"
    );

    NegotiatedParameters {
        target_throughput_bytes_per_sec,
        part_size,
        source,
    }
}

pub fn gbps_to_bytes_per_sec(gbps: f64) -> u64 {
    (gbps * BITS_PER_GIGABIT / BITS_PER_BYTE).round() as u64
}

fn positive(value: Option<i64>) -> Option<u64> {
    value.filter(|v| *v > 0).map(|v| v as u64)
}

/// Host query for the network throughput the engine should aim for.
pub trait ThroughputAdvisor: Send + Sync {
    fn recommended_throughput_gbps(&self) -> Option<f64>;
}

/// Advisor returning a fixed recommendation.
#[derive(Debug, Clone, Copy)]
pub struct FixedThroughputAdvisor(pub f64);

impl ThroughputAdvisor for FixedThroughputAdvisor {
    fn recommended_throughput_gbps(&self) -> Option<f64> {
        Some(self.0)
    }
}

/// Advisor for environments where no recommendation is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoThroughputAdvisor;

impl ThroughputAdvisor for NoThroughputAdvisor {
    fn recommended_throughput_gbps(&self) -> Option<f64> {
        None
    }
}

/// Recommends the speed of the fastest physical, non-loopback link on the host.
///
/// Interfaces are enumerated through `sysinfo`; link speeds come from
/// `/sys/class/net/<iface>/speed` (Mb/s), so the advisor yields `None` outside Linux
/// or wherever sysfs is hidden.
#[derive(Debug, Clone)]
pub struct NetworkThroughputAdvisor {
    sysfs_root: PathBuf,
}

impl Default for NetworkThroughputAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkThroughputAdvisor {
    pub fn new() -> Self {
        Self::with_sysfs_root(SYSFS_NET_ROOT)
    }

    pub fn with_sysfs_root<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            sysfs_root: root.into(),
        }
    }

    pub(crate) fn fastest_link_gbps<'a, I>(&self, interfaces: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'a str>,
    {
        interfaces
            .into_iter()
            .filter(|name| !name.starts_with(LOOPBACK_PREFIX))
            .filter(|name| is_physical_link(&self.sysfs_root, name))
            .filter_map(|name| read_link_speed_mbps(&self.sysfs_root, name))
            .map(|mbps| mbps / MEGABITS_PER_GIGABIT)
            .fold(None, |best: Option<f64>, gbps| {
                Some(best.map_or(gbps, |current| current.max(gbps)))
            })
    }
}

impl ThroughputAdvisor for NetworkThroughputAdvisor {
    fn recommended_throughput_gbps(&self) -> Option<f64> {
        if !cfg!(target_os = "linux") {
            return None;
        }

        let networks = Networks::new_with_refreshed_list();
        let recommendation = self.fastest_link_gbps(networks.list().keys().map(String::as_str));
        debug!("Platform throughput recommendation: {recommendation:?} Gb/s");
        recommendation
    }
}

/// Virtual interfaces (veth, bridges, tunnels) have no backing `device` entry.
fn is_physical_link(root: &Path, interface: &str) -> bool {
    root.join(interface).join("device").exists()
}

fn read_link_speed_mbps(root: &Path, interface: &str) -> Option<f64> {
    let path = root.join(interface).join("speed");
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) => {
            debug!("Cannot read link speed from {}: {err}", path.display());
            return None;
        }
    };
    // Drivers report -1 when the speed is unknown.
    contents
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|mbps| *mbps > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_speed(root: &Path, interface: &str, contents: &str) {
        let dir = root.join(interface);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("speed"), contents).unwrap();
    }

    fn write_physical_speed(root: &Path, interface: &str, contents: &str) {
        write_speed(root, interface, contents);
        fs::create_dir_all(root.join(interface).join("device")).unwrap();
    }

    #[test]
    fn configured_bandwidth_wins_over_recommendation() {
        let config = TransferConfig::new().with_max_bandwidth(50_000_000);
        let negotiated = negotiate(&config, Some(100.0));
        assert_eq!(negotiated.target_throughput_bytes_per_sec, 50_000_000);
        assert_eq!(negotiated.source, ThroughputSource::Configured);
    }

    #[test]
    fn recommendation_is_converted_from_gigabits() {
        let config = TransferConfig::new().with_multipart_chunksize(8_388_608);
        let negotiated = negotiate(&config, Some(20.0));
        assert_eq!(negotiated.target_throughput_bytes_per_sec, 2_500_000_000);
        assert_eq!(negotiated.part_size, Some(8_388_608));
        assert_eq!(negotiated.source, ThroughputSource::Recommended);
    }

    #[test]
    fn fractional_recommendation_within_tolerance() {
        let negotiated = negotiate(&TransferConfig::default(), Some(2.5));
        let expected = 2.5 * 1_000_000_000.0 / 8.0;
        let actual = negotiated.target_throughput_bytes_per_sec as f64;
        assert!((actual - expected).abs() <= 1.0);
    }

    #[test]
    fn falls_back_to_default() {
        let negotiated = negotiate(&TransferConfig::default(), None);
        assert_eq!(negotiated.target_throughput_bytes_per_sec, 10_000_000_000 / 8);
        assert_eq!(negotiated.part_size, None);
        assert_eq!(negotiated.source, ThroughputSource::Default);
        assert_eq!(
            gbps_to_bytes_per_sec(DEFAULT_TARGET_THROUGHPUT_GBPS),
            DEFAULT_TARGET_THROUGHPUT_BYTES_PER_SEC
        );
    }

    #[test]
    fn non_positive_values_count_as_unset() {
        let config = TransferConfig::new()
            .with_max_bandwidth(0)
            .with_multipart_chunksize(-1);
        let negotiated = negotiate(&config, Some(20.0));
        assert_eq!(negotiated.target_throughput_bytes_per_sec, 2_500_000_000);
        assert_eq!(negotiated.part_size, None);

        let negotiated = negotiate(&TransferConfig::new().with_max_bandwidth(-5), None);
        assert_eq!(
            negotiated.target_throughput_bytes_per_sec,
            DEFAULT_TARGET_THROUGHPUT_BYTES_PER_SEC
        );
    }

    #[test]
    fn unusable_recommendation_is_ignored() {
        for gbps in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let negotiated = negotiate(&TransferConfig::default(), Some(gbps));
            assert_eq!(negotiated.source, ThroughputSource::Default);
        }
    }

    #[test]
    fn advisor_picks_fastest_non_loopback_link() {
        let temp = TempDir::new().unwrap();
        write_speed(temp.path(), "lo", "100000\n");
        write_physical_speed(temp.path(), "eth0", "10000\n");
        write_physical_speed(temp.path(), "eth1", "25000\n");
        write_physical_speed(temp.path(), "wlan0", "-1\n");

        let advisor = NetworkThroughputAdvisor::with_sysfs_root(temp.path());
        let gbps = advisor.fastest_link_gbps(["lo", "eth0", "eth1", "wlan0", "missing0"]);
        assert_eq!(gbps, Some(25.0));
    }

    #[test]
    fn advisor_without_readable_links_returns_none() {
        let temp = TempDir::new().unwrap();
        write_physical_speed(temp.path(), "eth0", "garbage");

        let advisor = NetworkThroughputAdvisor::with_sysfs_root(temp.path());
        assert_eq!(advisor.fastest_link_gbps(["eth0", "docker0"]), None);
    }

    #[test]
    fn virtual_interfaces_are_ignored() {
        let temp = TempDir::new().unwrap();
        write_physical_speed(temp.path(), "eth0", "1000\n");
        write_speed(temp.path(), "veth3a1f", "10000\n");
        write_speed(temp.path(), "docker0", "100000\n");

        let advisor = NetworkThroughputAdvisor::with_sysfs_root(temp.path());
        assert_eq!(
            advisor.fastest_link_gbps(["veth3a1f", "docker0", "eth0"]),
            Some(1.0)
        );
        assert_eq!(advisor.fastest_link_gbps(["veth3a1f", "docker0"]), None);
    }

    #[test]
    fn fixed_and_empty_advisors() {
        assert_eq!(FixedThroughputAdvisor(20.0).recommended_throughput_gbps(), Some(20.0));
        assert_eq!(NoThroughputAdvisor.recommended_throughput_gbps(), None);
    }
}
