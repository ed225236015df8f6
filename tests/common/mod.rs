// Shared test helpers: result builders, a scripted probe executor and recording sinks
#![allow(dead_code)]

use chrono::Local;
use nocwatch::models::{LeaseOutcome, ProbeResult, Snapshot};
use nocwatch::probe::ProbeExecutor;
use nocwatch::sink::{SinkError, SnapshotSink};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

pub fn lease_result(renewed: bool, ipv4: bool, latency_ms: u64) -> ProbeResult {
    let lease = if renewed {
        LeaseOutcome::succeeded(Duration::from_millis(2500))
    } else {
        LeaseOutcome::failed()
    };
    ProbeResult::lease_renewal(
        lease,
        ipv4,
        true,
        Duration::from_millis(latency_ms),
        Local::now(),
    )
}

pub fn connectivity_result(ipv4: bool, ipv6: bool, latency_ms: u64) -> ProbeResult {
    ProbeResult::connectivity(ipv4, ipv6, Duration::from_millis(latency_ms), Local::now())
}

/// Executor returning fixed answers. `latency_delay` makes every probe take that long
/// (in tokio time) so overruns can be simulated with a paused clock.
#[derive(Clone)]
pub struct FakeExecutor {
    pub lease: LeaseOutcome,
    pub ipv4: bool,
    pub ipv6: bool,
    pub latency: Duration,
    pub latency_delay: Duration,
    pub probe_starts: Arc<Mutex<Vec<Instant>>>,
    in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
}

impl FakeExecutor {
    pub fn healthy() -> Self {
        Self {
            lease: LeaseOutcome::succeeded(Duration::from_millis(2500)),
            ipv4: true,
            ipv6: true,
            latency: Duration::from_millis(15),
            latency_delay: Duration::ZERO,
            probe_starts: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            lease: LeaseOutcome::failed(),
            ipv4: false,
            ipv6: false,
            latency: Duration::ZERO,
            ..Self::healthy()
        }
    }

    pub fn with_latency_delay(mut self, delay: Duration) -> Self {
        self.latency_delay = delay;
        self
    }

    pub fn starts(&self) -> Vec<Instant> {
        self.probe_starts.lock().unwrap().clone()
    }
}

impl ProbeExecutor for FakeExecutor {
    async fn run_lease_renewal(&self) -> LeaseOutcome {
        self.lease
    }

    async fn check_ipv4(&self) -> bool {
        self.ipv4
    }

    async fn check_ipv6(&self) -> bool {
        self.ipv6
    }

    async fn measure_latency(&self) -> Duration {
        self.probe_starts.lock().unwrap().push(Instant::now());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency_delay.is_zero() {
            tokio::time::sleep(self.latency_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.latency
    }
}

/// Keeps every snapshot it receives together with the (tokio) time it arrived.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub received: Arc<Mutex<Vec<(Instant, Snapshot)>>>,
}

impl RecordingSink {
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|(_, s)| s.clone())
            .collect()
    }

    pub fn arrival_times(&self) -> Vec<Instant> {
        self.received.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

impl SnapshotSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn accept(&mut self, snapshot: &Snapshot) -> Result<(), SinkError> {
        self.received
            .lock()
            .unwrap()
            .push((Instant::now(), snapshot.clone()));
        Ok(())
    }
}

/// Always fails, counting attempts.
#[derive(Clone, Default)]
pub struct FailingSink {
    pub attempts: Arc<AtomicUsize>,
}

impl SnapshotSink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    fn accept(&mut self, _snapshot: &Snapshot) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SinkError::Closed)
    }
}
