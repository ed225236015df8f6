// Snapshot: immutable point-in-time summary handed to sinks

use chrono::{DateTime, Local};
use serde::Serialize;

use super::ProbeResult;

/// Number of recent entries per probe class carried in a snapshot.
pub const RECENT_WINDOW: usize = 10;

/// Owned copy of the aggregated state. Recent lists are oldest-first within the window,
/// so the last element is the newest result of that class.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub taken_at: DateTime<Local>,
    pub total_count: u64,
    pub success_count: u64,
    /// Overall success rate in percent; 0 when nothing has been recorded.
    pub success_rate: f64,
    pub lease_success_rate: f64,
    pub connectivity_success_rate: f64,
    pub recent_lease: Vec<ProbeResult>,
    pub recent_connectivity: Vec<ProbeResult>,
}

impl Snapshot {
    pub fn failure_count(&self) -> u64 {
        self.total_count - self.success_count
    }

    pub fn latest_lease(&self) -> Option<&ProbeResult> {
        self.recent_lease.last()
    }

    pub fn latest_connectivity(&self) -> Option<&ProbeResult> {
        self.recent_connectivity.last()
    }
}
