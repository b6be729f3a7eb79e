// Sampling loop: one explicit handle owning cache, history and the collector.
// One-shot reads go through `get_current_metrics`; streams are producer tasks feeding watch channels.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError};

use tokio::sync::{Mutex, watch};
use tokio::time::Duration;
use tokio_stream::wrappers::WatchStream;
use tracing::Instrument;

use crate::cache::{DEFAULT_CACHE_TTL, SnapshotCache};
use crate::collector::MetricsCollector;
use crate::error::MetricsError;
use crate::health;
use crate::history::aggregation::{self, AveragingStrategy};
use crate::history::{DEFAULT_HISTORY_CAPACITY, HistoryBuffer};
use crate::models::*;

/// Floor applied to any requested stream interval.
pub const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_millis(1000);

/// Health stream only re-emits when the score moves at least this much (or issues change).
const HEALTH_SCORE_EPSILON: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub cache_ttl: Duration,
    pub history_capacity: usize,
    pub min_interval: Duration,
    pub health_interval: Duration,
    pub averaging: AveragingStrategy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            min_interval: MIN_SAMPLE_INTERVAL,
            health_interval: DEFAULT_HEALTH_INTERVAL,
            averaging: aggregation::simple_average,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Initialized,
    /// Initialized with at least one live stream producer.
    Running,
}

/// Cheap to clone; all clones share the same cache, history and collector.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<Inner>,
}

struct Inner {
    config: MonitorConfig,
    collector: Arc<dyn MetricsCollector>,
    cache: SnapshotCache,
    history: HistoryBuffer,
    initialized: AtomicBool,
    init_lock: Mutex<()>,
    /// Held across cache-miss -> collect -> history push -> cache put.
    sample_lock: Mutex<()>,
    /// Session generation, bumped by `destroy`. Guards the history/cache commit.
    session: std::sync::Mutex<u64>,
    /// Bumped by `destroy` to stop every stream producer.
    shutdown: watch::Sender<u64>,
    producers: AtomicUsize,
}

impl Monitor {
    pub fn new(collector: Arc<dyn MetricsCollector>, config: MonitorConfig) -> Self {
        let (shutdown, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                cache: SnapshotCache::new(config.cache_ttl),
                history: HistoryBuffer::new(config.history_capacity),
                config,
                collector,
                initialized: AtomicBool::new(false),
                init_lock: Mutex::new(()),
                sample_lock: Mutex::new(()),
                session: std::sync::Mutex::new(0),
                shutdown,
                producers: AtomicUsize::new(0),
            }),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    pub fn state(&self) -> MonitorState {
        if !self.inner.initialized.load(Ordering::Acquire) {
            MonitorState::Idle
        } else if self.inner.producers.load(Ordering::Acquire) > 0 {
            MonitorState::Running
        } else {
            MonitorState::Initialized
        }
    }

    /// Idempotent; concurrent callers serialize and only the first performs setup.
    pub async fn initialize(&self) {
        if self.inner.initialized.load(Ordering::Acquire) {
            return;
        }
        let _guard = self.inner.init_lock.lock().await;
        if self.inner.initialized.load(Ordering::Acquire) {
            return;
        }
        self.inner.collector.reset_baseline();
        self.inner.cache.clear();
        self.inner.initialized.store(true, Ordering::Release);
        tracing::info!(
            cache_ttl_ms = self.inner.config.cache_ttl.as_millis() as u64,
            history_capacity = self.inner.history.capacity(),
            "monitor initialized"
        );
    }

    /// Fresh cached snapshot, or a new collection that is cached and appended to history.
    pub async fn get_current_metrics(&self) -> Result<Snapshot, MetricsError> {
        self.ensure_initialized("get_current_metrics")?;
        if let Some(snapshot) = self.inner.cache.get() {
            return Ok(snapshot);
        }

        let _guard = self.inner.sample_lock.lock().await;
        // Another caller may have filled the cache while we waited for the lock
        if let Some(snapshot) = self.inner.cache.get() {
            return Ok(snapshot);
        }
        let session = self.current_session("get_current_metrics")?;
        let snapshot = self.collect_snapshot().await;
        self.commit(session, &snapshot)?;
        tracing::debug!(
            operation = "get_current_metrics",
            timestamp = snapshot.timestamp,
            "collected snapshot"
        );
        Ok(snapshot)
    }

    /// Emit-on-change snapshot stream sampled every `max(interval_ms, min_interval)`.
    pub async fn observe_metrics(
        &self,
        interval_ms: u64,
    ) -> Result<Subscription<Snapshot>, MetricsError> {
        let first = self.get_current_metrics().await?;
        let interval = Duration::from_millis(interval_ms).max(self.inner.config.min_interval);
        Ok(self.spawn_producer("observe_metrics", interval, first, |s| s, |prev, next| {
            prev != next
        }))
    }

    /// Health score stream; re-emits when the score moves by >= 1 point or the issue set changes.
    pub async fn observe_health_score(&self) -> Result<Subscription<HealthScore>, MetricsError> {
        let first = health::evaluate(&self.get_current_metrics().await?);
        let interval = self
            .inner
            .config
            .health_interval
            .max(self.inner.config.min_interval);
        Ok(self.spawn_producer(
            "observe_health_score",
            interval,
            first,
            |s| health::evaluate(&s),
            |prev, next| {
                (prev.score() - next.score()).abs() >= HEALTH_SCORE_EPSILON
                    || prev.issues() != next.issues()
            },
        ))
    }

    /// Up to `count` most recent snapshots, oldest first.
    pub fn get_history(&self, count: usize) -> Result<Vec<Snapshot>, MetricsError> {
        self.ensure_initialized("get_history")?;
        Ok(self.inner.history.recent(count))
    }

    pub fn clear_history(&self) {
        self.inner.history.clear();
    }

    /// Aggregate of the last complete `window`.
    pub fn get_aggregated(&self, window: TimeWindow) -> Result<AggregatedRecord, MetricsError> {
        let now = unix_now_ms().map_err(|e| MetricsError::aggregation("get_aggregated", e))?;
        self.get_aggregated_at(window, now)
    }

    pub fn get_aggregated_at(
        &self,
        window: TimeWindow,
        now_ms: u64,
    ) -> Result<AggregatedRecord, MetricsError> {
        self.ensure_initialized("get_aggregated")?;
        let history = self.inner.history.to_vec();
        Ok(aggregation::aggregate_with(
            &history,
            window,
            now_ms,
            self.inner.config.averaging,
        ))
    }

    /// `count` contiguous complete windows, oldest first.
    pub fn get_aggregated_history(
        &self,
        window: TimeWindow,
        count: usize,
    ) -> Result<Vec<AggregatedRecord>, MetricsError> {
        let now =
            unix_now_ms().map_err(|e| MetricsError::aggregation("get_aggregated_history", e))?;
        self.get_aggregated_history_at(window, count, now)
    }

    pub fn get_aggregated_history_at(
        &self,
        window: TimeWindow,
        count: usize,
        now_ms: u64,
    ) -> Result<Vec<AggregatedRecord>, MetricsError> {
        self.ensure_initialized("get_aggregated_history")?;
        let history = self.inner.history.to_vec();
        Ok(aggregation::aggregate_series_with(
            &history,
            window,
            now_ms,
            count,
            self.inner.config.averaging,
        ))
    }

    /// Stops all streams, clears cache and history, resets collector baselines. Idempotent.
    pub fn destroy(&self) {
        let was_initialized = {
            let mut session = self.session();
            *session += 1;
            let was_initialized = self.inner.initialized.swap(false, Ordering::AcqRel);
            self.inner.cache.clear();
            self.inner.history.clear();
            was_initialized
        };
        self.inner.shutdown.send_modify(|generation| *generation += 1);
        self.inner.collector.reset_baseline();
        if was_initialized {
            tracing::info!("monitor destroyed");
        }
    }

    fn session(&self) -> std::sync::MutexGuard<'_, u64> {
        self.inner
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Generation a collection belongs to; fails if the monitor is not initialized.
    fn current_session(&self, operation: &'static str) -> Result<u64, MetricsError> {
        let session = self.session();
        self.ensure_initialized(operation)?;
        Ok(*session)
    }

    /// Stores a fresh snapshot unless `destroy` ran since `session` was read.
    /// History is written before the cache so a cache hit is always already in history.
    fn commit(&self, session: u64, snapshot: &Snapshot) -> Result<(), MetricsError> {
        let current = self.session();
        if *current != session || !self.inner.initialized.load(Ordering::Acquire) {
            tracing::debug!(
                operation = "get_current_metrics",
                timestamp = snapshot.timestamp,
                "monitor destroyed during collection; snapshot discarded"
            );
            return Err(MetricsError::NotInitialized {
                operation: "get_current_metrics",
            });
        }
        self.inner.history.push(snapshot.clone());
        self.inner.cache.put(snapshot.clone());
        Ok(())
    }

    fn ensure_initialized(&self, operation: &'static str) -> Result<(), MetricsError> {
        if self.inner.initialized.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(MetricsError::NotInitialized { operation })
        }
    }

    /// Builds one snapshot; a failing family is logged and replaced by its empty value.
    async fn collect_snapshot(&self) -> Snapshot {
        let c = &self.inner.collector;
        let (cpu, memory, battery, thermal, storage, network, uptime) = tokio::join!(
            c.cpu(),
            c.memory(),
            c.battery(),
            c.thermal(),
            c.storage(),
            c.network(),
            c.uptime(),
        );
        Snapshot {
            timestamp: unix_now_ms().unwrap_or_else(|e| {
                tracing::warn!(error = %e, operation = "get_timestamp", "system time error");
                0
            }),
            uptime_secs: or_empty("uptime", uptime, || 0),
            cpu: or_empty("cpu", cpu, CpuStats::empty),
            memory: or_empty("memory", memory, MemoryStats::empty),
            battery: or_empty("battery", battery, BatteryStats::empty),
            thermal: or_empty("thermal", thermal, ThermalStats::empty),
            storage: or_empty("storage", storage, StorageStats::empty),
            network: or_empty("network", network, NetworkStats::empty),
        }
    }

    fn spawn_producer<T, M, C>(
        &self,
        operation: &'static str,
        interval: Duration,
        initial: T,
        map: M,
        changed: C,
    ) -> Subscription<T>
    where
        T: Clone + Send + Sync + 'static,
        M: Fn(Snapshot) -> T + Send + 'static,
        C: Fn(&T, &T) -> bool + Send + 'static,
    {
        let (tx, rx) = watch::channel(initial);
        let monitor = self.clone();
        let mut shutdown_rx = self.inner.shutdown.subscribe();
        self.inner.producers.fetch_add(1, Ordering::AcqRel);

        let span = tracing::debug_span!(
            "producer",
            operation,
            interval_ms = interval.as_millis() as u64
        );
        tokio::spawn(
            async move {
                let _live = ProducerGuard(monitor.inner.clone());
                tracing::debug!("stream started");
                loop {
                    tokio::select! {
                        _ = tx.closed() => break,
                        _ = shutdown_rx.changed() => break,
                        _ = tokio::time::sleep(interval) => {}
                    }
                    match monitor.get_current_metrics().await {
                        Ok(snapshot) => {
                            let next = map(snapshot);
                            tx.send_if_modified(|current| {
                                if changed(current, &next) {
                                    *current = next;
                                    true
                                } else {
                                    false
                                }
                            });
                        }
                        Err(MetricsError::NotInitialized { .. }) => break,
                        Err(e) => {
                            tracing::warn!(error = %e, "stream sample failed");
                        }
                    }
                }
                tracing::debug!("stream stopped");
            }
            .instrument(span),
        );

        Subscription { rx }
    }
}

/// Decrements the live-producer count when a producer task exits.
struct ProducerGuard(Arc<Inner>);

impl Drop for ProducerGuard {
    fn drop(&mut self) {
        self.0.producers.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Replay-latest view of a producer. Dropping it (or its stream) stops the producer.
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> Subscription<T> {
    /// Most recently emitted value.
    pub fn latest(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Waits for the next emission; None once the producer has stopped.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Stream that yields the latest value first, then every change.
    pub fn into_stream(self) -> WatchStream<T> {
        WatchStream::new(self.rx)
    }
}

fn or_empty<T>(family: &'static str, result: anyhow::Result<T>, empty: impl FnOnce() -> T) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            let e = MetricsError::collector(family, e);
            tracing::warn!(error = %e, operation = family, "collector failed; using empty value");
            empty()
        }
    }
}

pub(crate) fn unix_now_ms() -> Result<u64, std::time::SystemTimeError> {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
}
