// Probe scheduler: one task drives the lease, connectivity and emit triggers from a single
// select loop and is the only writer of the Aggregator.
//
// Actions run inline in the loop, so a probe that overruns delays every other trigger until it
// finishes (including emission), and no trigger is ever re-entered. A missed tick fires as soon
// as the loop is free again and the next one is scheduled a full period after that.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior, interval, interval_at};
use tracing::{debug, info, warn};

use crate::aggregator::Aggregator;
use crate::models::ProbeResult;
use crate::probe::{ProbeExecutor, run_connectivity_probe, run_full_probe};
use crate::sink::SnapshotSink;

/// Rate limit for repeated failures of the same sink (e.g. a dashboard that already exited).
const SINK_WARN_INTERVAL: Duration = Duration::from_secs(60);

/// Longest accepted trigger period. Longer values would overflow deadline arithmetic.
pub const MAX_PERIOD: Duration = Duration::from_secs(86_400 * 365);

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Clamps a period into `MIN_PERIOD..=MAX_PERIOD`; tokio intervals panic on zero.
pub(crate) fn bounded_period(period: Duration) -> Duration {
    period.clamp(MIN_PERIOD, MAX_PERIOD)
}

/// Trigger periods. Probe triggers first fire one period after start; emission fires at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub lease_interval: Duration,
    pub connectivity_interval: Duration,
    pub emit_interval: Duration,
    /// How often running totals are logged at INFO.
    pub stats_log_interval: Duration,
}

impl ScheduleConfig {
    /// 1s emission for the dashboard, 60s when unattended.
    pub fn for_mode(headless: bool) -> Self {
        Self {
            lease_interval: Duration::from_secs(300),
            connectivity_interval: Duration::from_secs(60),
            emit_interval: if headless {
                Duration::from_secs(60)
            } else {
                Duration::from_secs(1)
            },
            stats_log_interval: Duration::from_secs(600),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self::for_mode(false)
    }
}

struct SinkSlot {
    sink: Box<dyn SnapshotSink>,
    last_warn: Option<Instant>,
}

/// An idle scheduler. `spawn` starts it; the task returns the final Aggregator when stopped.
pub struct Scheduler<E> {
    executor: E,
    aggregator: Aggregator,
    sinks: Vec<SinkSlot>,
    config: ScheduleConfig,
}

impl<E: ProbeExecutor> Scheduler<E> {
    pub fn new(executor: E, config: ScheduleConfig) -> Self {
        Self {
            executor,
            aggregator: Aggregator::new(),
            sinks: Vec::new(),
            config,
        }
    }

    pub fn with_sink(mut self, sink: impl SnapshotSink + 'static) -> Self {
        self.add_sink(Box::new(sink));
        self
    }

    pub fn add_sink(&mut self, sink: Box<dyn SnapshotSink>) {
        self.sinks.push(SinkSlot {
            sink,
            last_warn: None,
        });
    }

    /// Runs on a new task until `shutdown_rx` fires or its sender is dropped.
    pub fn spawn(self, shutdown_rx: oneshot::Receiver<()>) -> tokio::task::JoinHandle<Aggregator> {
        tokio::spawn(self.run(shutdown_rx))
    }

    pub async fn run(mut self, mut shutdown_rx: oneshot::Receiver<()>) -> Aggregator {
        let ScheduleConfig {
            lease_interval,
            connectivity_interval,
            emit_interval,
            stats_log_interval,
        } = self.config.clone();
        let lease_interval = bounded_period(lease_interval);
        let connectivity_interval = bounded_period(connectivity_interval);
        let emit_interval = bounded_period(emit_interval);
        let stats_log_interval = bounded_period(stats_log_interval);

        let start = Instant::now();
        let mut lease_tick = interval_at(start + lease_interval, lease_interval);
        lease_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut connectivity_tick = interval_at(start + connectivity_interval, connectivity_interval);
        connectivity_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut emit_tick = interval(emit_interval);
        emit_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stats_log_tick = interval_at(start + stats_log_interval, stats_log_interval);
        stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            lease_interval_secs = lease_interval.as_secs(),
            connectivity_interval_secs = connectivity_interval.as_secs(),
            emit_interval_ms = emit_interval.as_millis() as u64,
            sinks = self.sinks.len(),
            "Scheduler running"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    debug!("Scheduler shutting down");
                    break;
                }
                _ = lease_tick.tick() => {
                    let result = run_full_probe(&self.executor).await;
                    self.record(result);
                }
                _ = connectivity_tick.tick() => {
                    let result = run_connectivity_probe(&self.executor).await;
                    self.record(result);
                }
                _ = emit_tick.tick() => {
                    self.emit();
                }
                _ = stats_log_tick.tick() => {
                    info!(
                        total_count = self.aggregator.total_count(),
                        success_count = self.aggregator.success_count(),
                        "probe stats"
                    );
                }
            }
        }

        info!(
            total_count = self.aggregator.total_count(),
            success_count = self.aggregator.success_count(),
            "Scheduler stopped"
        );
        self.aggregator
    }

    fn record(&mut self, result: ProbeResult) {
        let kind = result.kind().label();
        if result.success() {
            debug!(
                kind,
                latency_ms = result.latency().as_millis() as u64,
                "probe succeeded"
            );
        } else {
            info!(
                kind,
                ipv4 = result.ipv4_reachable(),
                ipv6 = result.ipv6_reachable(),
                latency_ms = result.latency().as_millis() as u64,
                "probe failed"
            );
        }
        self.aggregator.record(result);
    }

    fn emit(&mut self) {
        let snapshot = self.aggregator.snapshot();
        for slot in &mut self.sinks {
            if let Err(e) = slot.sink.accept(&snapshot) {
                let should_warn = slot
                    .last_warn
                    .is_none_or(|t| t.elapsed() >= SINK_WARN_INTERVAL);
                if should_warn {
                    warn!(sink = slot.sink.name(), error = %e, "snapshot sink failed");
                    slot.last_warn = Some(Instant::now());
                }
            }
        }
    }
}
