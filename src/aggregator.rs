// Aggregator: owns both history stores and the running totals.
// Recording takes `&mut self` and snapshots take `&self`, so a snapshot can never observe a
// counter bump without its history entry. Sinks get an owned Snapshot, never a reference here.

use chrono::Local;

use crate::history::{HistoryStore, percentage};
use crate::models::{ProbeKind, ProbeResult, RECENT_WINDOW, Snapshot};

#[derive(Debug, Default)]
pub struct Aggregator {
    lease: HistoryStore,
    connectivity: HistoryStore,
    total_count: u64,
    success_count: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the result and appends it to the store of its own kind. The kind is fixed at
    /// construction, so a result can never land in the other class's history.
    pub fn record(&mut self, result: ProbeResult) {
        self.count(&result);
        match result.kind() {
            ProbeKind::LeaseRenewal => self.lease.append(result),
            ProbeKind::Connectivity => self.connectivity.append(result),
        }
    }

    fn count(&mut self, result: &ProbeResult) {
        self.total_count += 1;
        if result.success() {
            self.success_count += 1;
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            taken_at: Local::now(),
            total_count: self.total_count,
            success_count: self.success_count,
            success_rate: percentage(self.success_count, self.total_count),
            lease_success_rate: self.lease.success_rate(),
            connectivity_success_rate: self.connectivity.success_rate(),
            recent_lease: self.lease.latest(RECENT_WINDOW).to_vec(),
            recent_connectivity: self.connectivity.latest(RECENT_WINDOW).to_vec(),
        }
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn success_count(&self) -> u64 {
        self.success_count
    }

    pub fn history(&self, kind: ProbeKind) -> &HistoryStore {
        match kind {
            ProbeKind::LeaseRenewal => &self.lease,
            ProbeKind::Connectivity => &self.connectivity,
        }
    }
}
