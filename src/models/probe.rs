// Probe result model: one immutable record per probe execution

use chrono::{DateTime, Local};
use serde::Serialize;
use std::time::Duration;

use super::duration::{serialize_ms, serialize_opt_ms};

/// Probe class; selects the history store and the cadence a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProbeKind {
    /// Full probe: lease renewal followed by reachability and latency.
    LeaseRenewal,
    /// Reachability and latency only.
    Connectivity,
}

impl ProbeKind {
    /// Short label used in the log file and dashboard.
    pub fn label(self) -> &'static str {
        match self {
            ProbeKind::LeaseRenewal => "DHCP",
            ProbeKind::Connectivity => "Ping",
        }
    }
}

/// Outcome of one lease release/renew cycle. A failed renewal carries a zero duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaseOutcome {
    pub duration: Duration,
    pub succeeded: bool,
}

impl LeaseOutcome {
    pub fn succeeded(duration: Duration) -> Self {
        Self {
            duration,
            succeeded: true,
        }
    }

    pub fn failed() -> Self {
        Self::default()
    }
}

/// One probe execution. `success` is derived once in the constructors and cannot change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    kind: ProbeKind,
    #[serde(rename = "leaseRenewMs", serialize_with = "serialize_opt_ms")]
    lease_renew_duration: Option<Duration>,
    ipv4_reachable: bool,
    ipv6_reachable: bool,
    #[serde(rename = "latencyMs", serialize_with = "serialize_ms")]
    latency: Duration,
    success: bool,
    timestamp: DateTime<Local>,
}

impl ProbeResult {
    /// Full probe result: succeeds when the lease renewed, IPv4 answered and latency was measured.
    pub fn lease_renewal(
        lease: LeaseOutcome,
        ipv4_reachable: bool,
        ipv6_reachable: bool,
        latency: Duration,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            kind: ProbeKind::LeaseRenewal,
            lease_renew_duration: Some(lease.duration),
            ipv4_reachable,
            ipv6_reachable,
            latency,
            success: lease.succeeded && ipv4_reachable && !latency.is_zero(),
            timestamp,
        }
    }

    /// Connectivity-only result: succeeds when IPv4 answered and latency was measured.
    /// IPv6 is reported but does not affect success.
    pub fn connectivity(
        ipv4_reachable: bool,
        ipv6_reachable: bool,
        latency: Duration,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            kind: ProbeKind::Connectivity,
            lease_renew_duration: None,
            ipv4_reachable,
            ipv6_reachable,
            latency,
            success: ipv4_reachable && !latency.is_zero(),
            timestamp,
        }
    }

    pub fn kind(&self) -> ProbeKind {
        self.kind
    }

    pub fn lease_renew_duration(&self) -> Option<Duration> {
        self.lease_renew_duration
    }

    pub fn ipv4_reachable(&self) -> bool {
        self.ipv4_reachable
    }

    pub fn ipv6_reachable(&self) -> bool {
        self.ipv6_reachable
    }

    /// Zero when latency could not be measured.
    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }
}
