use anyhow::Result;
use pulsemon::collector::SysinfoCollector;
use pulsemon::*;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tokio_stream::StreamExt;
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

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "{} starting",
        env!("CARGO_PKG_NAME")
    );

    let monitor = Monitor::new(
        Arc::new(SysinfoCollector::new()),
        app_config.sampling.monitor_config(),
    );
    monitor.initialize().await;

    let frame_monitor = Arc::new(FrameMonitor::new(
        app_config.frames.analyzer_config(),
        app_config.frames.event_capacity,
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let frame_source = app_config.frames.enabled.then(|| {
        frame_monitor.start();
        frames::spawn_interval_source(
            frame_monitor.clone(),
            app_config.frames.target_fps,
            shutdown_rx.clone(),
        )
    });

    let mut metrics = monitor
        .observe_metrics(app_config.sampling.interval_ms)
        .await?
        .into_stream();
    let mut health_scores = monitor.observe_health_score().await?.into_stream();
    let mut events = frame_monitor.event_stream();

    let mut stats_log_tick = interval(Duration::from_secs(
        app_config.reporting.stats_log_interval_secs,
    ));
    stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let window = app_config.reporting.aggregate_window;

    let shutdown = async {
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
    };
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(snapshot) = metrics.next() => {
                tracing::debug!(
                    cpu_percent = snapshot.cpu.usage_percent,
                    memory_percent = snapshot.memory.usage_percent,
                    cpu_temperature = snapshot.thermal.cpu_temperature,
                    rx_bytes_per_sec = snapshot.network.rx_bytes_per_sec,
                    tx_bytes_per_sec = snapshot.network.tx_bytes_per_sec,
                    "snapshot"
                );
            }
            Some(score) = health_scores.next() => {
                tracing::info!(
                    score = score.score(),
                    status = ?score.status(),
                    issues = ?score.issues(),
                    "health"
                );
                for r in score.recommendations() {
                    tracing::info!(recommendation = %r, "health recommendation");
                }
            }
            Some(event) = events.next() => {
                match event {
                    Ok(event) => tracing::info!(?event, "frame peak event"),
                    Err(e) => tracing::debug!(error = %e, "frame event subscriber lagged"),
                }
            }
            _ = stats_log_tick.tick() => {
                match monitor.get_aggregated(window) {
                    Ok(record) => match serde_json::to_string(&record) {
                        Ok(json) => tracing::info!(window = %window, aggregate = %json, "aggregate"),
                        Err(e) => tracing::warn!(error = %e, "aggregate serialization failed"),
                    },
                    Err(e) => tracing::warn!(error = %e, operation = "get_aggregated", "aggregation failed"),
                }
                if app_config.frames.enabled {
                    let stats = frame_monitor.current_stats();
                    tracing::info!(
                        average_fps = stats.average_fps,
                        min_fps = stats.min_fps,
                        max_fps = stats.max_fps,
                        total_frames = stats.total_frames,
                        total_jank_frames = stats.total_jank_frames,
                        critical_episodes = stats.critical_episodes,
                        "frame stats"
                    );
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Received shutdown signal");
                break;
            }
        }
    }

    frame_monitor.stop();
    let _ = shutdown_tx.send(true);
    if let Some(handle) = frame_source {
        let _ = handle.await;
    }
    monitor.destroy();
    Ok(())
}
