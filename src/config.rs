use serde::Deserialize;
use std::time::Duration;

use crate::scheduler::{MAX_PERIOD, ScheduleConfig};

const DEFAULT_CONFIG_PATH: &str = "noc-watch.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub interface: InterfaceConfig,
    #[serde(default)]
    pub mode: ModeConfig,
    #[serde(default)]
    pub schedule: ScheduleSettings,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceConfig {
    /// Interface all probes are bound to (overridden by WIFI_INTERFACE).
    #[serde(default = "default_interface")]
    pub name: String,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            name: default_interface(),
        }
    }
}

fn default_interface() -> String {
    "wlan0".into()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModeConfig {
    /// Unattended run: no dashboard, snapshots only go to the log file (overridden by HEADLESS).
    #[serde(default)]
    pub headless: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleSettings {
    #[serde(default = "default_lease_interval_secs")]
    pub lease_interval_secs: u64,
    #[serde(default = "default_connectivity_interval_secs")]
    pub connectivity_interval_secs: u64,
    /// Snapshot emission period; when omitted, 1s interactive and 60s headless.
    #[serde(default)]
    pub emit_interval_ms: Option<u64>,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            lease_interval_secs: default_lease_interval_secs(),
            connectivity_interval_secs: default_connectivity_interval_secs(),
            emit_interval_ms: None,
        }
    }
}

fn default_lease_interval_secs() -> u64 {
    300
}

fn default_connectivity_interval_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_ipv4_target")]
    pub ipv4_target: String,
    #[serde(default = "default_ipv6_target")]
    pub ipv6_target: String,
    /// Echo requests sent for the latency measurement.
    #[serde(default = "default_latency_count")]
    pub latency_count: u32,
    /// Per-reply wait passed to ping (-W).
    #[serde(default = "default_ping_wait_secs")]
    pub ping_wait_secs: u32,
    /// Hard limit on any single external command.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    /// Pause between lease release and renew.
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,
    #[serde(default = "default_use_sudo")]
    pub use_sudo: bool,
    #[serde(default = "default_dhcp_client")]
    pub dhcp_client: String,
    #[serde(default = "default_resolv_conf")]
    pub resolv_conf: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ipv4_target: default_ipv4_target(),
            ipv6_target: default_ipv6_target(),
            latency_count: default_latency_count(),
            ping_wait_secs: default_ping_wait_secs(),
            command_timeout_secs: default_command_timeout_secs(),
            settle_secs: default_settle_secs(),
            use_sudo: default_use_sudo(),
            dhcp_client: default_dhcp_client(),
            resolv_conf: default_resolv_conf(),
        }
    }
}

fn default_ipv4_target() -> String {
    "8.8.8.8".into()
}

fn default_ipv6_target() -> String {
    "2001:4860:4860::8888".into()
}

fn default_latency_count() -> u32 {
    3
}

fn default_ping_wait_secs() -> u32 {
    5
}

fn default_command_timeout_secs() -> u64 {
    15
}

fn default_settle_secs() -> u64 {
    2
}

fn default_use_sudo() -> bool {
    true
}

fn default_dhcp_client() -> String {
    "dhclient".into()
}

fn default_resolv_conf() -> String {
    "/etc/resolv.conf".into()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Append-only results file (overridden by LOG_FILE).
    #[serde(default = "default_log_path")]
    pub path: String,
    /// Minimum time between two blocks written to the results file.
    #[serde(default = "default_log_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
            interval_secs: default_log_interval_secs(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_path() -> String {
    "noc-watch.log".into()
}

fn default_log_interval_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log running totals at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            stats_log_interval_secs: default_stats_log_interval_secs(),
        }
    }
}

fn default_stats_log_interval_secs() -> u64 {
    600
}

impl AppConfig {
    /// Reads CONFIG_FILE (default `noc-watch.toml`; a missing default file means all defaults),
    /// then applies WIFI_INTERFACE, LOG_FILE and HEADLESS from the environment.
    pub fn load() -> anyhow::Result<Self> {
        let explicit = std::env::var("CONFIG_FILE").ok();
        let path = explicit.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut config = match std::fs::read_to_string(path) {
            Ok(s) => toml::from_str(&s)?,
            Err(e) if explicit.is_none() && e.kind() == std::io::ErrorKind::NotFound => {
                AppConfig::default()
            }
            Err(e) => return Err(anyhow::anyhow!("reading {}: {}", path, e)),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests). No environment overrides.
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies the environment-style overrides; `lookup` returns the variable's value if set.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("WIFI_INTERFACE").filter(|v| !v.is_empty()) {
            self.interface.name = name;
        }
        if let Some(path) = lookup("LOG_FILE").filter(|v| !v.is_empty()) {
            self.log.path = path;
        }
        if let Some(headless) = lookup("HEADLESS") {
            self.mode.headless = headless == "true";
        }
    }

    pub fn schedule_config(&self) -> ScheduleConfig {
        let mut schedule = ScheduleConfig::for_mode(self.mode.headless);
        schedule.lease_interval = Duration::from_secs(self.schedule.lease_interval_secs);
        schedule.connectivity_interval =
            Duration::from_secs(self.schedule.connectivity_interval_secs);
        if let Some(ms) = self.schedule.emit_interval_ms {
            schedule.emit_interval = Duration::from_millis(ms);
        }
        schedule.stats_log_interval = Duration::from_secs(self.monitoring.stats_log_interval_secs);
        schedule
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.interface.name.trim().is_empty(),
            "interface.name must be non-empty"
        );
        ensure_period_secs(
            "schedule.lease_interval_secs",
            self.schedule.lease_interval_secs,
        )?;
        ensure_period_secs(
            "schedule.connectivity_interval_secs",
            self.schedule.connectivity_interval_secs,
        )?;
        if let Some(ms) = self.schedule.emit_interval_ms {
            anyhow::ensure!(
                ms > 0 && u128::from(ms) <= MAX_PERIOD.as_millis(),
                "schedule.emit_interval_ms must be in 1..={}, got {}",
                MAX_PERIOD.as_millis(),
                ms
            );
        }
        anyhow::ensure!(
            !self.probe.ipv4_target.is_empty(),
            "probe.ipv4_target must be non-empty"
        );
        anyhow::ensure!(
            !self.probe.ipv6_target.is_empty(),
            "probe.ipv6_target must be non-empty"
        );
        anyhow::ensure!(
            self.probe.latency_count > 0,
            "probe.latency_count must be > 0, got {}",
            self.probe.latency_count
        );
        ensure_period_secs("probe.command_timeout_secs", self.probe.command_timeout_secs)?;
        anyhow::ensure!(
            self.probe.settle_secs <= MAX_PERIOD.as_secs(),
            "probe.settle_secs must be <= {}, got {}",
            MAX_PERIOD.as_secs(),
            self.probe.settle_secs
        );
        anyhow::ensure!(
            !self.probe.dhcp_client.is_empty(),
            "probe.dhcp_client must be non-empty"
        );
        anyhow::ensure!(!self.log.path.is_empty(), "log.path must be non-empty");
        ensure_period_secs("log.interval_secs", self.log.interval_secs)?;
        ensure_period_secs(
            "monitoring.stats_log_interval_secs",
            self.monitoring.stats_log_interval_secs,
        )?;
        Ok(())
    }
}

/// Periods must be non-zero and no longer than a year.
fn ensure_period_secs(field: &str, secs: u64) -> anyhow::Result<()> {
    anyhow::ensure!(
        secs > 0 && secs <= MAX_PERIOD.as_secs(),
        "{} must be in 1..={}, got {}",
        field,
        MAX_PERIOD.as_secs(),
        secs
    );
    Ok(())
}
