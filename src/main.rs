use anyhow::Result;
use nocwatch::aggregator::Aggregator;
use nocwatch::config::AppConfig;
use nocwatch::dashboard::{self, DashboardView};
use nocwatch::probe::CommandProbeExecutor;
use nocwatch::scheduler::Scheduler;
use nocwatch::sink::{ChannelSink, LogFileSink};
use nocwatch::{interface, version};
use std::path::{Path, PathBuf};
use tokio::sync::oneshot;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

/// Headless runs log to stderr. With the dashboard on screen, diagnostics go to
/// `<log.path>.trace` so they do not tear the terminal view.
fn init_tracing(config: &AppConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter);

    if config.mode.headless {
        builder.init();
        return Ok(None);
    }

    let trace_path = PathBuf::from(format!("{}.trace", config.log.path));
    let dir = trace_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file = trace_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("invalid log.path: {}", config.log.path))?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file));
    builder.with_writer(writer).with_ansi(false).init();
    Ok(Some(guard))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().skip(1).any(|a| a == "--version" || a == "-V") {
        println!("{}", version::banner());
        return Ok(());
    }

    let app_config = AppConfig::load()?;
    let _trace_guard = init_tracing(&app_config)?;
    tracing::info!(
        interface = %app_config.interface.name,
        headless = app_config.mode.headless,
        log_path = %app_config.log.path,
        "Starting {}",
        version::banner()
    );
    interface::log_interface(&app_config.interface.name).await;

    let schedule = app_config.schedule_config();
    let executor = CommandProbeExecutor::new(&app_config.interface.name, app_config.probe.clone());
    let (log_sink, log_writer) = LogFileSink::spawn(&app_config.log);
    let mut scheduler = Scheduler::new(executor, schedule.clone()).with_sink(log_sink);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    if app_config.mode.headless {
        let scheduler_handle = scheduler.spawn(shutdown_rx);
        shutdown_signal().await;
        tracing::info!("Received shutdown signal");
        let _ = shutdown_tx.send(());
        scheduler_handle.await?;
        log_writer.await?;
        return Ok(());
    }

    let (dashboard_sink, snapshot_rx) =
        ChannelSink::channel("dashboard", Aggregator::new().snapshot());
    scheduler.add_sink(Box::new(dashboard_sink));
    let scheduler_handle = scheduler.spawn(shutdown_rx);

    let view = DashboardView {
        interface: app_config.interface.name.clone(),
        lease_interval: schedule.lease_interval,
        connectivity_interval: schedule.connectivity_interval,
    };
    let ui = tokio::task::spawn_blocking(move || dashboard::run(snapshot_rx, view));

    tokio::select! {
        result = ui => {
            // Terminal setup failure has no degraded mode: report it and exit.
            result??;
            tracing::info!("Dashboard closed");
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
        }
    }

    let _ = shutdown_tx.send(());
    scheduler_handle.await?;
    // The scheduler dropped the log sink, so the writer drains its queue and exits.
    log_writer.await?;
    Ok(())
}
