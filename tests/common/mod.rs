// Shared test helpers
#![allow(dead_code)]

use async_trait::async_trait;
use pulsemon::collector::MetricsCollector;
use pulsemon::models::*;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

pub fn minimal_snapshot(timestamp: u64) -> Snapshot {
    Snapshot::empty(timestamp)
}

/// Snapshot with the fields the scorer and aggregator read.
pub fn snapshot(timestamp: u64, cpu: f64, memory: f64, cpu_temp: f64, battery: f64) -> Snapshot {
    Snapshot {
        timestamp,
        cpu: CpuStats {
            usage_percent: cpu,
            ..CpuStats::empty()
        },
        memory: MemoryStats {
            usage_percent: memory,
            ..MemoryStats::empty()
        },
        battery: BatteryStats {
            level_percent: battery,
            ..BatteryStats::empty()
        },
        thermal: ThermalStats {
            cpu_temperature: cpu_temp,
            ..ThermalStats::empty()
        },
        ..Snapshot::empty(timestamp)
    }
}

pub fn with_network(mut s: Snapshot, rx: u64, tx: u64) -> Snapshot {
    s.network.rx_bytes = rx;
    s.network.tx_bytes = tx;
    s
}

/// Collector double: counts collections, cpu usage increments per call, families can be failed.
pub struct FakeCollector {
    pub calls: AtomicUsize,
    pub resets: AtomicUsize,
    cpu_step: AtomicU64,
    failing: Mutex<HashSet<&'static str>>,
    fixed_cpu: Mutex<Option<f64>>,
    cpu_delay: Mutex<Option<std::time::Duration>>,
}

impl Default for FakeCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeCollector {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
            cpu_step: AtomicU64::new(0),
            failing: Mutex::new(HashSet::new()),
            fixed_cpu: Mutex::new(None),
            cpu_delay: Mutex::new(None),
        }
    }

    pub fn fail(&self, family: &'static str) {
        self.failing.lock().unwrap().insert(family);
    }

    /// Pin the CPU reading so consecutive snapshots differ only by timestamp.
    pub fn fix_cpu(&self, value: f64) {
        *self.fixed_cpu.lock().unwrap() = Some(value);
    }

    /// The next `cpu()` call sleeps for `delay` before answering.
    pub fn delay_next_cpu(&self, delay: std::time::Duration) {
        *self.cpu_delay.lock().unwrap() = Some(delay);
    }

    pub fn collections(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, family: &'static str) -> anyhow::Result<()> {
        if self.failing.lock().unwrap().contains(family) {
            anyhow::bail!("{} unavailable", family);
        }
        Ok(())
    }
}

#[async_trait]
impl MetricsCollector for FakeCollector {
    async fn cpu(&self) -> anyhow::Result<CpuStats> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check("cpu")?;
        let usage = match *self.fixed_cpu.lock().unwrap() {
            Some(v) => v,
            None => (self.cpu_step.fetch_add(10, Ordering::SeqCst) % 100) as f64,
        };
        let delay = self.cpu_delay.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(CpuStats {
            usage_percent: usage,
            physical_cores: 4,
            logical_cores: 8,
            frequencies_mhz: vec![2400; 8],
            max_frequency_mhz: 3600,
        })
    }

    async fn memory(&self) -> anyhow::Result<MemoryStats> {
        self.check("memory")?;
        Ok(MemoryStats {
            total_mb: 8192,
            used_mb: 4096,
            free_mb: 2048,
            available_mb: 4096,
            usage_percent: 50.0,
        })
    }

    async fn battery(&self) -> anyhow::Result<BatteryStats> {
        self.check("battery")?;
        Ok(BatteryStats {
            level_percent: 80.0,
            temperature: 30.0,
            status: BatteryStatus::Discharging,
            health: BatteryHealth::Good,
        })
    }

    async fn thermal(&self) -> anyhow::Result<ThermalStats> {
        self.check("thermal")?;
        Ok(ThermalStats {
            cpu_temperature: 40.0,
            battery_temperature: 30.0,
            throttling: false,
        })
    }

    async fn storage(&self) -> anyhow::Result<StorageStats> {
        self.check("storage")?;
        Ok(StorageStats {
            total_mb: 100_000,
            used_mb: 50_000,
            free_mb: 50_000,
            usage_percent: 50.0,
        })
    }

    async fn network(&self) -> anyhow::Result<NetworkStats> {
        self.check("network")?;
        Ok(NetworkStats {
            rx_bytes: 1000,
            tx_bytes: 500,
            rx_bytes_per_sec: 0.0,
            tx_bytes_per_sec: 0.0,
            connection: ConnectionType::Wifi,
        })
    }

    async fn uptime(&self) -> anyhow::Result<u64> {
        self.check("uptime")?;
        Ok(3600)
    }

    fn reset_baseline(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}
