// Frame-timing facade: start/stop gate, analyzer state, and the two push channels.
// Independent of the sampling monitor; never takes its locks.

pub mod analyzer;
mod ring;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, watch};
use tokio::time::{Duration, Instant, MissedTickBehavior, interval};
use tokio_stream::wrappers::{BroadcastStream, WatchStream};

use crate::models::{FrameMetrics, FrameStatistics, PeakEvent};
pub use analyzer::{AnalyzerConfig, FrameAnalyzer, fps_from_delta};
pub use ring::FrameRing;

/// Peak events buffered per subscriber before the oldest is dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 16;

pub struct FrameMonitor {
    analyzer: Mutex<FrameAnalyzer>,
    collecting: AtomicBool,
    metrics_tx: watch::Sender<FrameMetrics>,
    events_tx: broadcast::Sender<PeakEvent>,
}

impl Default for FrameMonitor {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default(), DEFAULT_EVENT_CAPACITY)
    }
}

impl FrameMonitor {
    pub fn new(config: AnalyzerConfig, event_capacity: usize) -> Self {
        let (metrics_tx, _) = watch::channel(FrameMetrics::default());
        let (events_tx, _) = broadcast::channel(event_capacity.max(1));
        Self {
            analyzer: Mutex::new(FrameAnalyzer::new(config)),
            collecting: AtomicBool::new(false),
            metrics_tx,
            events_tx,
        }
    }

    /// Idempotent. Resuming after `stop` starts a fresh window; the gap is not measured.
    pub fn start(&self) {
        let mut analyzer = self.analyzer();
        if !self.collecting.swap(true, Ordering::AcqRel) {
            analyzer.restart_window();
            self.metrics_tx.send_replace(FrameMetrics::default());
            tracing::debug!("frame collection started");
        }
    }

    /// Idempotent; frames delivered after this are ignored until the next `start`.
    pub fn stop(&self) {
        if self.collecting.swap(false, Ordering::AcqRel) {
            tracing::debug!("frame collection stopped");
        }
    }

    pub fn is_collecting(&self) -> bool {
        self.collecting.load(Ordering::Acquire)
    }

    /// Presentation callback. Ignored while stopped.
    pub fn on_frame(&self, timestamp_ns: u64) {
        if !self.is_collecting() {
            return;
        }
        let metrics = self.analyzer().on_frame(timestamp_ns, |event| {
            tracing::debug!(?event, "peak event");
            // No subscribers is not an error
            let _ = self.events_tx.send(event);
        });
        self.metrics_tx.send_replace(metrics);
    }

    pub fn current_stats(&self) -> FrameStatistics {
        self.analyzer().statistics(self.is_collecting())
    }

    /// Clears the window and all counters; collection state is unchanged.
    pub fn reset(&self) {
        self.analyzer().reset();
        self.metrics_tx.send_replace(FrameMetrics::default());
    }

    /// Latest metrics, replayed to new subscribers.
    pub fn subscribe_metrics(&self) -> watch::Receiver<FrameMetrics> {
        self.metrics_tx.subscribe()
    }

    pub fn metrics_stream(&self) -> WatchStream<FrameMetrics> {
        WatchStream::new(self.subscribe_metrics())
    }

    /// Bounded per subscriber; a lagging subscriber loses the oldest events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<PeakEvent> {
        self.events_tx.subscribe()
    }

    /// Event stream; lag surfaces as `BroadcastStreamRecvError::Lagged` items.
    pub fn event_stream(&self) -> BroadcastStream<PeakEvent> {
        BroadcastStream::new(self.subscribe_events())
    }

    fn analyzer(&self) -> MutexGuard<'_, FrameAnalyzer> {
        self.analyzer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Feeds `frames` from a tokio interval at `target_fps`, stamping monotonic nanoseconds.
/// Stands in for a display's presentation callback when no host surface exists.
pub fn spawn_interval_source(
    frames: Arc<FrameMonitor>,
    target_fps: u32,
    mut shutdown_rx: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    let period = Duration::from_nanos(1_000_000_000 / u64::from(target_fps.max(1)));
    tokio::spawn(async move {
        let origin = Instant::now();
        let mut tick = interval(period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                now = tick.tick() => {
                    frames.on_frame(now.duration_since(origin).as_nanos() as u64);
                }
                _ = shutdown_rx.changed() => {
                    tracing::debug!("frame source shutting down");
                    break;
                }
            }
        }
    })
}
