// Probe execution capability and the two probe compositions the scheduler runs.

mod command;
mod ping;

pub use command::{CommandProbeExecutor, ProbeError};
pub use ping::parse_average_rtt;

use chrono::Local;
use std::future::Future;
use std::time::Duration;

use crate::models::{LeaseOutcome, ProbeResult};

/// The four network actions the scheduler consumes.
///
/// Implementations own their timeouts: every call must return in bounded time, and failures
/// are reported as data (`false`, zero duration), never as errors.
pub trait ProbeExecutor: Send + Sync + 'static {
    /// Release and renew the address lease; duration is measured from the renew request.
    fn run_lease_renewal(&self) -> impl Future<Output = LeaseOutcome> + Send;

    fn check_ipv4(&self) -> impl Future<Output = bool> + Send;

    fn check_ipv6(&self) -> impl Future<Output = bool> + Send;

    /// Round-trip latency; `Duration::ZERO` means unmeasured.
    fn measure_latency(&self) -> impl Future<Output = Duration> + Send;
}

/// Lease renewal, then reachability and latency, in that order.
pub async fn run_full_probe<E: ProbeExecutor>(executor: &E) -> ProbeResult {
    let timestamp = Local::now();
    let lease = executor.run_lease_renewal().await;
    let ipv4 = executor.check_ipv4().await;
    let ipv6 = executor.check_ipv6().await;
    let latency = executor.measure_latency().await;
    ProbeResult::lease_renewal(lease, ipv4, ipv6, latency, timestamp)
}

/// Reachability and latency without touching the lease.
pub async fn run_connectivity_probe<E: ProbeExecutor>(executor: &E) -> ProbeResult {
    let timestamp = Local::now();
    let ipv4 = executor.check_ipv4().await;
    let ipv6 = executor.check_ipv6().await;
    let latency = executor.measure_latency().await;
    ProbeResult::connectivity(ipv4, ipv6, latency, timestamp)
}
