// Append-only results file. The sink renders one block (or one JSON line) per interval and
// queues it; a separate writer task does the file I/O so the scheduler never waits on disk.

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{SinkError, SnapshotSink};
use crate::config::{LogConfig, LogFormat};
use crate::models::{Snapshot, format_duration};
use crate::scheduler::bounded_period;

/// Closing line of every text block.
pub const LOG_DELIMITER: &str = "==========================================";

/// Records waiting for the writer. At one record per interval this only fills when the disk
/// is stuck, and then new records are dropped instead of stalling the scheduler.
pub const LOG_QUEUE_CAPACITY: usize = 16;

const HEADER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const WRITE_WARN_INTERVAL: Duration = Duration::from_secs(60);

/// Renders one record in the configured format, newline-terminated.
pub fn render_record(snapshot: &Snapshot, format: LogFormat) -> Result<String, SinkError> {
    match format {
        LogFormat::Text => Ok(render_log_block(snapshot)),
        LogFormat::Json => {
            let mut line = serde_json::to_string(snapshot)?;
            line.push('\n');
            Ok(line)
        }
    }
}

/// Appends records to the results file, creating it if missing.
#[derive(Debug, Clone)]
pub struct LogWriter {
    path: PathBuf,
}

impl LogWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blocking append of one record.
    pub fn append(&self, record: &str) -> Result<(), SinkError> {
        let io_err = |source| SinkError::Io {
            path: self.path.display().to_string(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        file.write_all(record.as_bytes()).map_err(io_err)
    }

    /// Writes queued records on the blocking pool until every sender is dropped, then drains
    /// what is left and exits.
    pub fn spawn(self, mut rx: mpsc::Receiver<String>) -> JoinHandle<()> {
        let writer = Arc::new(self);
        tokio::spawn(async move {
            let mut last_warn: Option<Instant> = None;
            while let Some(record) = rx.recv().await {
                let w = Arc::clone(&writer);
                let result = match tokio::task::spawn_blocking(move || w.append(&record)).await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(error = %e, "log writer: append task failed");
                        continue;
                    }
                };
                if let Err(e) = result
                    && last_warn.is_none_or(|t| t.elapsed() >= WRITE_WARN_INTERVAL)
                {
                    warn!(error = %e, "log writer: append failed");
                    last_warn = Some(Instant::now());
                }
            }
            debug!(path = %writer.path.display(), "Log writer shutting down");
        })
    }
}

pub struct LogFileSink {
    tx: mpsc::Sender<String>,
    interval: Duration,
    format: LogFormat,
    next_due: Instant,
}

impl LogFileSink {
    /// Sink feeding `tx`. First record is queued one `interval` after construction.
    pub fn new(tx: mpsc::Sender<String>, interval: Duration, format: LogFormat) -> Self {
        let interval = bounded_period(interval);
        Self {
            tx,
            interval,
            format,
            next_due: Instant::now() + interval,
        }
    }

    /// Sink plus its writer task for `log.path`. The writer exits once the sink is dropped.
    pub fn spawn(config: &LogConfig) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(LOG_QUEUE_CAPACITY);
        let writer = LogWriter::new(&config.path).spawn(rx);
        let sink = Self::new(tx, Duration::from_secs(config.interval_secs), config.format);
        (sink, writer)
    }
}

impl SnapshotSink for LogFileSink {
    fn name(&self) -> &str {
        "log_file"
    }

    fn accept(&mut self, snapshot: &Snapshot) -> Result<(), SinkError> {
        let now = Instant::now();
        if now < self.next_due {
            return Ok(());
        }
        // Advance even on failure so a stuck writer is retried once per interval, not per emit.
        self.next_due = now + self.interval;
        let record = render_record(snapshot, self.format)?;
        self.tx.try_send(record).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::Backlog,
            TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

/// Text block for one snapshot:
///
/// ```text
///
/// === WiFi Quality Test Results - 2024-01-01 12:00:00 ===
/// DHCP Test: Success=true, Time=2.5s
/// Ping Test: Success=true, IPv4=true, IPv6=true, Latency=15ms
/// Total Tests: 2, Success: 2, Success Rate: 100.00%
/// DHCP Success Rate: 100.00%
/// Ping Success Rate: 100.00%
/// ==========================================
/// ```
///
/// The DHCP and Ping lines describe the newest result of each class and are left out while
/// that class has no results.
pub fn render_log_block(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_block(&mut out, snapshot);
    out
}

fn write_block(out: &mut String, s: &Snapshot) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(
        out,
        "=== WiFi Quality Test Results - {} ===",
        s.taken_at.format(HEADER_TIME_FORMAT)
    )?;
    if let Some(lease) = s.latest_lease() {
        writeln!(
            out,
            "DHCP Test: Success={}, Time={}",
            lease.success(),
            format_duration(lease.lease_renew_duration().unwrap_or_default())
        )?;
    }
    if let Some(ping) = s.latest_connectivity() {
        writeln!(
            out,
            "Ping Test: Success={}, IPv4={}, IPv6={}, Latency={}",
            ping.success(),
            ping.ipv4_reachable(),
            ping.ipv6_reachable(),
            format_duration(ping.latency())
        )?;
    }
    writeln!(
        out,
        "Total Tests: {}, Success: {}, Success Rate: {:.2}%",
        s.total_count, s.success_count, s.success_rate
    )?;
    writeln!(out, "DHCP Success Rate: {:.2}%", s.lease_success_rate)?;
    writeln!(out, "Ping Success Rate: {:.2}%", s.connectivity_success_rate)?;
    writeln!(out, "{LOG_DELIMITER}")
}
