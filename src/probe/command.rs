// ProbeExecutor backed by external commands (dhclient, ping, ping6).
// Every command is bounded by the configured timeout and killed if it overruns.

use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tokio::time::{Instant, timeout};
use tracing::{debug, instrument};

use super::{ProbeExecutor, ping::parse_average_rtt};
use crate::config::ProbeConfig;
use crate::models::LeaseOutcome;

/// Why a single probe command did not succeed. Absorbed into probe results, never propagated.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("{program} exited with {status}")]
    Exit { program: String, status: ExitStatus },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no nameserver configured in {0}")]
    NoNameserver(String),
}

pub struct CommandProbeExecutor {
    interface: String,
    config: ProbeConfig,
}

impl CommandProbeExecutor {
    pub fn new(interface: impl Into<String>, config: ProbeConfig) -> Self {
        Self {
            interface: interface.into(),
            config,
        }
    }

    fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.config.command_timeout_secs)
    }

    /// Runs `program args..`, optionally through sudo; non-zero exit is an error.
    async fn run(&self, program: &str, args: &[&str], sudo: bool) -> Result<Output, ProbeError> {
        let mut cmd = if sudo {
            let mut c = Command::new("sudo");
            c.arg(program);
            c
        } else {
            Command::new(program)
        };
        cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);

        let limit = self.command_timeout();
        let output = timeout(limit, cmd.output())
            .await
            .map_err(|_| ProbeError::Timeout {
                program: program.to_string(),
                timeout: limit,
            })?
            .map_err(|source| ProbeError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::Exit {
                program: program.to_string(),
                status: output.status,
            });
        }
        Ok(output)
    }

    async fn ping(&self, program: &str, target: &str, count: u32) -> Result<Output, ProbeError> {
        let count = count.to_string();
        let wait = self.config.ping_wait_secs.to_string();
        let args = [
            "-I",
            self.interface.as_str(),
            "-c",
            count.as_str(),
            "-W",
            wait.as_str(),
            target,
        ];
        self.run(program, &args, false).await
    }

    async fn renew_lease(&self) -> Result<Duration, ProbeError> {
        let client = self.config.dhcp_client.as_str();
        let sudo = self.config.use_sudo;

        // Release result is ignored: an interface without a lease is still worth renewing.
        if let Err(e) = self.run(client, &["-r", self.interface.as_str()], sudo).await {
            debug!(error = %e, "lease release failed");
        }
        tokio::time::sleep(Duration::from_secs(self.config.settle_secs)).await;

        let start = Instant::now();
        self.run(client, &[self.interface.as_str()], sudo).await?;

        let path = self.config.resolv_conf.as_str();
        let resolv = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ProbeError::Read {
                path: path.to_string(),
                source,
            })?;
        if !resolv.contains("nameserver") {
            return Err(ProbeError::NoNameserver(path.to_string()));
        }
        Ok(start.elapsed())
    }
}

impl ProbeExecutor for CommandProbeExecutor {
    #[instrument(skip(self), fields(interface = %self.interface))]
    async fn run_lease_renewal(&self) -> LeaseOutcome {
        match self.renew_lease().await {
            Ok(duration) => LeaseOutcome::succeeded(duration),
            Err(e) => {
                debug!(error = %e, "lease renewal failed");
                LeaseOutcome::failed()
            }
        }
    }

    async fn check_ipv4(&self) -> bool {
        match self.ping("ping", &self.config.ipv4_target, 1).await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, target = %self.config.ipv4_target, "IPv4 check failed");
                false
            }
        }
    }

    async fn check_ipv6(&self) -> bool {
        match self.ping("ping6", &self.config.ipv6_target, 1).await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, target = %self.config.ipv6_target, "IPv6 check failed");
                false
            }
        }
    }

    async fn measure_latency(&self) -> Duration {
        let start = Instant::now();
        match self
            .ping("ping", &self.config.ipv4_target, self.config.latency_count)
            .await
        {
            // Without a parsable summary the command's own duration is the best estimate.
            Ok(output) => parse_average_rtt(&String::from_utf8_lossy(&output.stdout))
                .unwrap_or_else(|| start.elapsed()),
            Err(e) => {
                debug!(error = %e, "latency measurement failed");
                Duration::ZERO
            }
        }
    }
}
