// Telemetry engine: cached sampling, bounded history, windowed aggregates,
// health scoring, and frame-timing analysis.

pub mod cache;
pub mod collector;
pub mod config;
pub mod error;
pub mod frames;
pub mod health;
pub mod history;
pub mod models;
pub mod monitor;

pub use error::MetricsError;
pub use frames::FrameMonitor;
pub use monitor::{Monitor, MonitorConfig, MonitorState, Subscription};
