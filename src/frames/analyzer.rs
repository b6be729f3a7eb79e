// Sliding-window frame-rate analysis and edge-triggered peak detection.
// Runs on the per-frame path: no allocation, no logging, no error returns.

use super::ring::FrameRing;
use crate::models::{FrameMetrics, FrameStatistics, PeakEvent};

const NANOS_PER_SEC: f64 = 1_000_000_000.0;
const NANOS_PER_MS: f64 = 1_000_000.0;

pub const MAX_FPS: f64 = 240.0;
/// ~2 seconds at 60 Hz.
pub const DEFAULT_WINDOW_CAPACITY: usize = 120;
/// 60 Hz frame budget (16.667 ms).
pub const DEFAULT_JANK_THRESHOLD_NS: u64 = 16_667_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerConfig {
    pub window_capacity: usize,
    /// Minimum fps fall between consecutive frames that counts as a drop.
    pub drop_threshold: f64,
    pub high_fps_threshold: f64,
    pub critical_fps_threshold: f64,
    pub jank_threshold_ns: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            drop_threshold: 10.0,
            high_fps_threshold: 58.0,
            critical_fps_threshold: 20.0,
            jank_threshold_ns: DEFAULT_JANK_THRESHOLD_NS,
        }
    }
}

/// Instantaneous fps for one frame interval: round(1e9 / delta) in [0, 240]; 0 for delta <= 0.
pub fn fps_from_delta(delta_ns: i64) -> f64 {
    if delta_ns <= 0 {
        return 0.0;
    }
    (NANOS_PER_SEC / delta_ns as f64).round().clamp(0.0, MAX_FPS)
}

pub struct FrameAnalyzer {
    config: AnalyzerConfig,
    ring: FrameRing,
    last_metrics: FrameMetrics,
    previous_fps: Option<f64>,
    last_critical_ns: Option<u64>,
    total_frames: u64,
    total_jank_frames: u64,
    critical_episodes: u64,
}

impl Default for FrameAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl FrameAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            ring: FrameRing::new(config.window_capacity),
            config,
            last_metrics: FrameMetrics::default(),
            previous_fps: None,
            last_critical_ns: None,
            total_frames: 0,
            total_jank_frames: 0,
            critical_episodes: 0,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Feeds one presentation timestamp; `emit` receives any peak events raised by this frame.
    pub fn on_frame(&mut self, timestamp_ns: u64, mut emit: impl FnMut(PeakEvent)) -> FrameMetrics {
        self.ring.push(timestamp_ns);
        self.total_frames += 1;

        let Some((previous_ns, newest_ns)) = self.ring.last_pair() else {
            self.last_metrics = FrameMetrics {
                frame_count: self.ring.len(),
                ..FrameMetrics::default()
            };
            return self.last_metrics;
        };

        let delta_ns = signed_delta(previous_ns, newest_ns);
        let current_fps = fps_from_delta(delta_ns);
        if delta_ns > self.config.jank_threshold_ns as i64 {
            self.total_jank_frames += 1;
        }

        let (min_fps, max_fps, window_jank) = self.walk_window();
        self.last_metrics = FrameMetrics {
            current_fps,
            average_fps: self.average_fps(),
            min_fps,
            max_fps,
            frame_count: self.ring.len(),
            frame_time_ms: if delta_ns > 0 {
                delta_ns as f64 / NANOS_PER_MS
            } else {
                0.0
            },
            jank_count: window_jank,
        };

        // A repeated timestamp carries no timing information; don't let it move the edge detector
        if delta_ns > 0 {
            if let Some(previous_fps) = self.previous_fps {
                self.detect_peaks(previous_fps, current_fps, newest_ns, &mut emit);
            }
            self.previous_fps = Some(current_fps);
        }
        self.last_metrics
    }

    fn detect_peaks(
        &mut self,
        previous_fps: f64,
        fps: f64,
        timestamp_ns: u64,
        emit: &mut impl FnMut(PeakEvent),
    ) {
        let fall = previous_fps - fps;
        if fall >= self.config.drop_threshold {
            emit(PeakEvent::FrameDrop {
                fps,
                delta: fall,
                previous_fps,
            });
        }

        let high = self.config.high_fps_threshold;
        if previous_fps < high && fps >= high {
            emit(PeakEvent::HighPerformance { fps });
        }

        let critical = self.config.critical_fps_threshold;
        if previous_fps >= critical && fps < critical {
            let since_previous_ms = self
                .last_critical_ns
                .map(|t| timestamp_ns.saturating_sub(t) / 1_000_000)
                .unwrap_or(0);
            self.last_critical_ns = Some(timestamp_ns);
            self.critical_episodes += 1;
            emit(PeakEvent::CriticalJank {
                fps,
                since_previous_ms,
            });
        }
    }

    /// (n - 1) intervals over the span between oldest and newest buffered frame.
    fn average_fps(&self) -> f64 {
        let (Some(oldest), Some(newest)) = (self.ring.oldest(), self.ring.newest()) else {
            return 0.0;
        };
        let span_ns = signed_delta(oldest, newest);
        if self.ring.len() < 2 || span_ns <= 0 {
            return 0.0;
        }
        let intervals = (self.ring.len() - 1) as f64;
        (intervals * NANOS_PER_SEC / span_ns as f64).clamp(0.0, MAX_FPS)
    }

    /// Min/max instantaneous fps and janky-interval count over consecutive buffered pairs.
    fn walk_window(&self) -> (f64, f64, u32) {
        let mut min_fps = f64::INFINITY;
        let mut max_fps: f64 = 0.0;
        let mut jank: u32 = 0;
        let mut previous: Option<u64> = None;
        for ts in self.ring.iter() {
            if let Some(prev) = previous {
                let delta = signed_delta(prev, ts);
                if delta > self.config.jank_threshold_ns as i64 {
                    jank += 1;
                }
                if delta > 0 {
                    let fps = fps_from_delta(delta);
                    min_fps = min_fps.min(fps);
                    max_fps = max_fps.max(fps);
                }
            }
            previous = Some(ts);
        }
        if min_fps.is_infinite() {
            min_fps = 0.0;
        }
        (min_fps, max_fps, jank)
    }

    pub fn metrics(&self) -> FrameMetrics {
        self.last_metrics
    }

    pub fn statistics(&self, collecting: bool) -> FrameStatistics {
        let m = self.last_metrics;
        FrameStatistics {
            current_fps: m.current_fps,
            average_fps: m.average_fps,
            min_fps: m.min_fps,
            max_fps: m.max_fps,
            frames_in_window: m.frame_count,
            window_jank_count: m.jank_count,
            total_frames: self.total_frames,
            total_jank_frames: self.total_jank_frames,
            critical_episodes: self.critical_episodes,
            collecting,
        }
    }

    /// Drops the window and edge-detector state so the next frame starts a fresh measurement.
    /// Cumulative totals survive.
    pub fn restart_window(&mut self) {
        self.ring.clear();
        self.last_metrics = FrameMetrics::default();
        self.previous_fps = None;
        self.last_critical_ns = None;
    }

    pub fn reset(&mut self) {
        self.ring.clear();
        self.last_metrics = FrameMetrics::default();
        self.previous_fps = None;
        self.last_critical_ns = None;
        self.total_frames = 0;
        self.total_jank_frames = 0;
        self.critical_episodes = 0;
    }
}

/// `newest - previous` as a signed value; saturates instead of wrapping on backwards clocks.
fn signed_delta(previous: u64, newest: u64) -> i64 {
    (newest as i128 - previous as i128).clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
