// Raw metric collection: the collector contract plus the sysinfo-backed implementation.

mod linux;

use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use sysinfo::{Components, Disks, Networks, System};
use tracing::instrument;

use crate::models::*;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Component temperature labels that identify the CPU package or cores.
const CPU_SENSOR_LABELS: [&str; 6] = ["cpu", "package", "core", "k10temp", "tctl", "soc"];

/// One call per metric family; the sampling loop substitutes an empty value for any family that fails.
#[async_trait]
pub trait MetricsCollector: Send + Sync {
    async fn cpu(&self) -> anyhow::Result<CpuStats>;
    async fn memory(&self) -> anyhow::Result<MemoryStats>;
    async fn battery(&self) -> anyhow::Result<BatteryStats>;
    async fn thermal(&self) -> anyhow::Result<ThermalStats>;
    async fn storage(&self) -> anyhow::Result<StorageStats>;
    async fn network(&self) -> anyhow::Result<NetworkStats>;
    /// Seconds since boot.
    async fn uptime(&self) -> anyhow::Result<u64>;

    /// Forget delta baselines (CPU usage, network rates) so the next sample starts fresh.
    fn reset_baseline(&self) {}
}

pub struct SysinfoCollector {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
    networks: Arc<Mutex<Networks>>,
    components: Arc<Mutex<Components>>,
    last_network: Arc<Mutex<Option<(u64, u64, Instant)>>>,
    last_cpu_refresh: Arc<Mutex<Option<(Instant, f64)>>>,
    last_throttle_count: Arc<Mutex<Option<u64>>>,
}

impl Default for SysinfoCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoCollector {
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(Disks::new_with_refreshed_list())),
            networks: Arc::new(Mutex::new(Networks::new_with_refreshed_list())),
            components: Arc::new(Mutex::new(Components::new_with_refreshed_list())),
            last_network: Arc::new(Mutex::new(None)),
            last_cpu_refresh: Arc::new(Mutex::new(None)),
            last_throttle_count: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl MetricsCollector for SysinfoCollector {
    #[instrument(skip(self), fields(collector = "sysinfo", operation = "cpu"))]
    async fn cpu(&self) -> anyhow::Result<CpuStats> {
        let sys = self.sys.clone();
        let last_cpu_refresh = self.last_cpu_refresh.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            let mut last = last_cpu_refresh
                .lock()
                .map_err(|e| anyhow::anyhow!("cpu baseline lock poisoned: {}", e))?;

            let now = Instant::now();
            let usage = match *last {
                Some((prev_ts, prev_usage))
                    if now.duration_since(prev_ts) < sysinfo::MINIMUM_CPU_UPDATE_INTERVAL =>
                {
                    // Too soon for a meaningful delta; reuse the previous reading
                    prev_usage
                }
                Some(_) => {
                    sys.refresh_cpu_all();
                    let usage = sys.global_cpu_usage() as f64;
                    *last = Some((now, usage));
                    usage
                }
                None => {
                    // First call only establishes the baseline
                    sys.refresh_cpu_all();
                    *last = Some((now, 0.0));
                    0.0
                }
            };

            Ok(CpuStats {
                usage_percent: usage.clamp(0.0, 100.0),
                physical_cores: System::physical_core_count().unwrap_or(0) as u32,
                logical_cores: sys.cpus().len() as u32,
                frequencies_mhz: sys.cpus().iter().map(|c| c.frequency()).collect(),
                max_frequency_mhz: linux::read_max_cpu_frequency_mhz(),
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "memory"))]
    async fn memory(&self) -> anyhow::Result<MemoryStats> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_memory();

            let total = sys.total_memory();
            let available = sys.available_memory();
            let used = total.saturating_sub(available);
            let usage_percent = if total > 0 {
                (used as f64 / total as f64) * 100.0
            } else {
                0.0
            };

            Ok(MemoryStats {
                total_mb: total / BYTES_PER_MB,
                used_mb: used / BYTES_PER_MB,
                free_mb: sys.free_memory() / BYTES_PER_MB,
                available_mb: available / BYTES_PER_MB,
                usage_percent: usage_percent.clamp(0.0, 100.0),
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "battery"))]
    async fn battery(&self) -> anyhow::Result<BatteryStats> {
        tokio::task::spawn_blocking(|| {
            // Mains-powered machines report a full battery so they don't read as LOW_BATTERY
            Ok(linux::read_battery()?.unwrap_or(BatteryStats {
                level_percent: 100.0,
                ..BatteryStats::empty()
            }))
        })
        .await
        .map_err(|e| anyhow::anyhow!("battery task join: {}", e))?
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "thermal"))]
    async fn thermal(&self) -> anyhow::Result<ThermalStats> {
        let components = self.components.clone();
        let last_throttle_count = self.last_throttle_count.clone();
        tokio::task::spawn_blocking(move || {
            let mut components = components
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo components lock poisoned: {}", e))?;
            components.refresh(false);

            let mut cpu_temperature: f64 = 0.0;
            let mut battery_temperature: f64 = 0.0;
            let mut at_critical = false;
            for c in components.list() {
                let Some(temp) = c.temperature() else {
                    continue;
                };
                let label = c.label().to_lowercase();
                if CPU_SENSOR_LABELS.iter().any(|l| label.contains(l)) {
                    cpu_temperature = cpu_temperature.max(temp as f64);
                    if c.critical().is_some_and(|crit| crit > 0.0 && temp >= crit) {
                        at_critical = true;
                    }
                } else if label.contains("bat") {
                    battery_temperature = battery_temperature.max(temp as f64);
                }
            }
            if battery_temperature == 0.0
                && let Ok(Some(b)) = linux::read_battery()
            {
                battery_temperature = b.temperature;
            }

            let throttled_since_last = match linux::read_throttle_count() {
                Some(count) => {
                    let mut last = last_throttle_count
                        .lock()
                        .map_err(|e| anyhow::anyhow!("throttle baseline lock poisoned: {}", e))?;
                    let increased = last.is_some_and(|prev| count > prev);
                    *last = Some(count);
                    increased
                }
                None => false,
            };

            Ok(ThermalStats {
                cpu_temperature,
                battery_temperature,
                throttling: at_critical || throttled_since_last,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "storage"))]
    async fn storage(&self) -> anyhow::Result<StorageStats> {
        let disks = self.disks.clone();
        tokio::task::spawn_blocking(move || {
            let mut disks = disks
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo disks lock poisoned: {}", e))?;
            disks.refresh(false);
            let (total, available) = disks
                .list()
                .iter()
                .fold((0u64, 0u64), |(t, a), d| {
                    (t + d.total_space(), a + d.available_space())
                });
            let used = total.saturating_sub(available);
            let usage_percent = if total > 0 {
                (used as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            Ok(StorageStats {
                total_mb: total / BYTES_PER_MB,
                used_mb: used / BYTES_PER_MB,
                free_mb: available / BYTES_PER_MB,
                usage_percent: usage_percent.clamp(0.0, 100.0),
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "network"))]
    async fn network(&self) -> anyhow::Result<NetworkStats> {
        let networks = self.networks.clone();
        let last_network = self.last_network.clone();
        tokio::task::spawn_blocking(move || {
            let mut networks = networks
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo networks lock poisoned: {}", e))?;
            networks.refresh(true);

            let mut rx_bytes: u64 = 0;
            let mut tx_bytes: u64 = 0;
            let mut connection = ConnectionType::None;
            for (name, data) in networks.list() {
                if name == "lo" {
                    continue;
                }
                rx_bytes += data.total_received();
                tx_bytes += data.total_transmitted();
                let kind = ConnectionType::from_interface_name(name);
                if connection == ConnectionType::None && data.total_received() > 0 {
                    connection = kind;
                }
            }

            let now = Instant::now();
            let mut last = last_network
                .lock()
                .map_err(|e| anyhow::anyhow!("network baseline lock poisoned: {}", e))?;
            let (rx_bytes_per_sec, tx_bytes_per_sec) = match *last {
                Some((prev_rx, prev_tx, prev_ts)) => {
                    let dt_secs = now.duration_since(prev_ts).as_secs_f64();
                    if dt_secs > 0.0 {
                        (
                            rx_bytes.saturating_sub(prev_rx) as f64 / dt_secs,
                            tx_bytes.saturating_sub(prev_tx) as f64 / dt_secs,
                        )
                    } else {
                        (0.0, 0.0)
                    }
                }
                None => (0.0, 0.0),
            };
            *last = Some((rx_bytes, tx_bytes, now));

            Ok(NetworkStats {
                rx_bytes,
                tx_bytes,
                rx_bytes_per_sec,
                tx_bytes_per_sec,
                connection,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    async fn uptime(&self) -> anyhow::Result<u64> {
        Ok(System::uptime())
    }

    fn reset_baseline(&self) {
        if let Ok(mut guard) = self.last_cpu_refresh.lock() {
            *guard = None;
        }
        if let Ok(mut guard) = self.last_network.lock() {
            *guard = None;
        }
        if let Ok(mut guard) = self.last_throttle_count.lock() {
            *guard = None;
        }
    }
}
