use serde::Deserialize;
use tokio::time::Duration;

use crate::frames::AnalyzerConfig;
use crate::frames::analyzer::MAX_FPS;
use crate::models::TimeWindow;
use crate::monitor::MonitorConfig;

const DEFAULT_CONFIG_PATH: &str = "pulsemon.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sampling: SamplingConfig,
    pub frames: FramesConfig,
    pub reporting: ReportingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub cache_ttl_ms: u64,
    pub history_capacity: usize,
    /// Interval of the metrics stream the binary subscribes to.
    pub interval_ms: u64,
    pub health_interval_ms: u64,
    /// Floor for any stream interval.
    pub min_interval_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: 500,
            history_capacity: 300,
            interval_ms: 1000,
            health_interval_ms: 1000,
            min_interval_ms: 100,
        }
    }
}

impl SamplingConfig {
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            cache_ttl: Duration::from_millis(self.cache_ttl_ms),
            history_capacity: self.history_capacity,
            min_interval: Duration::from_millis(self.min_interval_ms),
            health_interval: Duration::from_millis(self.health_interval_ms),
            ..MonitorConfig::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FramesConfig {
    pub enabled: bool,
    pub buffer_capacity: usize,
    /// Cadence of the built-in interval frame source.
    pub target_fps: u32,
    pub drop_threshold: f64,
    pub high_fps_threshold: f64,
    pub critical_fps_threshold: f64,
    pub jank_threshold_ms: f64,
    /// Peak events buffered per subscriber.
    pub event_capacity: usize,
}

impl Default for FramesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            buffer_capacity: 120,
            target_fps: 60,
            drop_threshold: 10.0,
            high_fps_threshold: 58.0,
            critical_fps_threshold: 20.0,
            jank_threshold_ms: 16.667,
            event_capacity: 16,
        }
    }
}

impl FramesConfig {
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            window_capacity: self.buffer_capacity,
            drop_threshold: self.drop_threshold,
            high_fps_threshold: self.high_fps_threshold,
            critical_fps_threshold: self.critical_fps_threshold,
            jank_threshold_ns: (self.jank_threshold_ms * 1_000_000.0).round() as u64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// How often the binary logs health, aggregate and frame stats at INFO level.
    pub stats_log_interval_secs: u64,
    pub aggregate_window: TimeWindow,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            stats_log_interval_secs: 60,
            aggregate_window: TimeWindow::FiveMinutes,
        }
    }
}

impl AppConfig {
    /// Reads `PULSEMON_CONFIG` (default `pulsemon.toml`). A missing default file yields defaults.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("PULSEMON_CONFIG") {
            Ok(path) => Self::load_from_path(&path),
            Err(_) if !std::path::Path::new(DEFAULT_CONFIG_PATH).exists() => {
                tracing::info!("{} not found; using default config", DEFAULT_CONFIG_PATH);
                Ok(Self::default())
            }
            Err(_) => Self::load_from_path(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn load_from_path(path: &str) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.sampling.cache_ttl_ms > 0,
            "sampling.cache_ttl_ms must be > 0, got {}",
            self.sampling.cache_ttl_ms
        );
        anyhow::ensure!(
            self.sampling.history_capacity > 0,
            "sampling.history_capacity must be > 0, got {}",
            self.sampling.history_capacity
        );
        anyhow::ensure!(
            self.sampling.min_interval_ms > 0,
            "sampling.min_interval_ms must be > 0, got {}",
            self.sampling.min_interval_ms
        );
        anyhow::ensure!(
            self.sampling.interval_ms > 0,
            "sampling.interval_ms must be > 0, got {}",
            self.sampling.interval_ms
        );
        anyhow::ensure!(
            self.sampling.health_interval_ms > 0,
            "sampling.health_interval_ms must be > 0, got {}",
            self.sampling.health_interval_ms
        );
        anyhow::ensure!(
            self.frames.buffer_capacity >= 2,
            "frames.buffer_capacity must be >= 2, got {}",
            self.frames.buffer_capacity
        );
        anyhow::ensure!(
            self.frames.target_fps > 0 && f64::from(self.frames.target_fps) <= MAX_FPS,
            "frames.target_fps must be between 1 and {}, got {}",
            MAX_FPS,
            self.frames.target_fps
        );
        anyhow::ensure!(
            self.frames.drop_threshold > 0.0,
            "frames.drop_threshold must be > 0, got {}",
            self.frames.drop_threshold
        );
        anyhow::ensure!(
            self.frames.critical_fps_threshold > 0.0
                && self.frames.critical_fps_threshold < self.frames.high_fps_threshold
                && self.frames.high_fps_threshold <= MAX_FPS,
            "frames thresholds must satisfy 0 < critical_fps_threshold < high_fps_threshold <= {}, got {} / {}",
            MAX_FPS,
            self.frames.critical_fps_threshold,
            self.frames.high_fps_threshold
        );
        anyhow::ensure!(
            self.frames.jank_threshold_ms > 0.0,
            "frames.jank_threshold_ms must be > 0, got {}",
            self.frames.jank_threshold_ms
        );
        anyhow::ensure!(
            self.frames.event_capacity > 0,
            "frames.event_capacity must be > 0, got {}",
            self.frames.event_capacity
        );
        anyhow::ensure!(
            self.reporting.stats_log_interval_secs > 0,
            "reporting.stats_log_interval_secs must be > 0, got {}",
            self.reporting.stats_log_interval_secs
        );
        Ok(())
    }
}
