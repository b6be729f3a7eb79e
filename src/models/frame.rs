// Frame-timing value objects produced by the analyzer on every presented frame.

use serde::{Deserialize, Serialize};

/// Per-frame view over the active sliding window. All fps values are in [0, 240].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameMetrics {
    pub current_fps: f64,
    pub average_fps: f64,
    pub min_fps: f64,
    pub max_fps: f64,
    /// Timestamps currently buffered (never above the window capacity).
    pub frame_count: usize,
    /// Interval between the two most recent frames.
    pub frame_time_ms: f64,
    /// Frame intervals in the window that exceeded the jank budget.
    pub jank_count: u32,
}

/// Analyzer summary returned by `FrameMonitor::current_stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameStatistics {
    pub current_fps: f64,
    pub average_fps: f64,
    pub min_fps: f64,
    pub max_fps: f64,
    pub frames_in_window: usize,
    pub window_jank_count: u32,
    pub total_frames: u64,
    pub total_jank_frames: u64,
    pub critical_episodes: u64,
    pub collecting: bool,
}

/// Discrete performance events, raised only on the tick a threshold is crossed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum PeakEvent {
    FrameDrop {
        fps: f64,
        delta: f64,
        previous_fps: f64,
    },
    HighPerformance {
        fps: f64,
    },
    CriticalJank {
        fps: f64,
        /// Milliseconds since the previous critical episode; 0 for the first one.
        since_previous_ms: u64,
    },
}

impl PeakEvent {
    pub fn fps(&self) -> f64 {
        match *self {
            PeakEvent::FrameDrop { fps, .. }
            | PeakEvent::HighPerformance { fps }
            | PeakEvent::CriticalJank { fps, .. } => fps,
        }
    }
}
