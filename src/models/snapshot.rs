// One sampling instant: per-family sub-records plus timestamp and uptime.
// Every family has an all-zero `empty()` used when its collector fails.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuStats {
    pub usage_percent: f64,
    pub physical_cores: u32,
    pub logical_cores: u32,
    /// Current frequency per logical core, MHz.
    pub frequencies_mhz: Vec<u64>,
    pub max_frequency_mhz: u64,
}

impl CpuStats {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub total_mb: u64,
    pub used_mb: u64,
    pub free_mb: u64,
    pub available_mb: u64,
    pub usage_percent: f64,
}

impl MemoryStats {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Charging state as reported by the power supply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryStatus {
    Charging,
    Discharging,
    Full,
    NotCharging,
    #[default]
    #[serde(other)]
    Unknown,
}

impl BatteryStatus {
    /// Parse the kernel's power_supply `status` string (e.g. "Charging").
    pub fn from_sysfs(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "charging" => BatteryStatus::Charging,
            "discharging" => BatteryStatus::Discharging,
            "full" => BatteryStatus::Full,
            "not charging" => BatteryStatus::NotCharging,
            _ => BatteryStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryHealth {
    Good,
    Overheat,
    Dead,
    OverVoltage,
    Cold,
    #[default]
    #[serde(other)]
    Unknown,
}

impl BatteryHealth {
    /// Parse the kernel's power_supply `health` string (e.g. "Good", "Over voltage").
    pub fn from_sysfs(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "good" => BatteryHealth::Good,
            "overheat" => BatteryHealth::Overheat,
            "dead" => BatteryHealth::Dead,
            "over voltage" => BatteryHealth::OverVoltage,
            "cold" => BatteryHealth::Cold,
            _ => BatteryHealth::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryStats {
    pub level_percent: f64,
    /// Degrees Celsius.
    pub temperature: f64,
    pub status: BatteryStatus,
    pub health: BatteryHealth,
}

impl BatteryStats {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermalStats {
    pub cpu_temperature: f64,
    pub battery_temperature: f64,
    pub throttling: bool,
}

impl ThermalStats {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub total_mb: u64,
    pub used_mb: u64,
    pub free_mb: u64,
    pub usage_percent: f64,
}

impl StorageStats {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    Wifi,
    Ethernet,
    Cellular,
    #[default]
    #[serde(other)]
    None,
}

impl ConnectionType {
    /// Guess the link type from a kernel interface name (wlan0, enp3s0, wwan0, ...).
    pub fn from_interface_name(name: &str) -> Self {
        if name.starts_with("wl") {
            ConnectionType::Wifi
        } else if name.starts_with("en") || name.starts_with("eth") {
            ConnectionType::Ethernet
        } else if name.starts_with("wwan") || name.starts_with("rmnet") || name.starts_with("ccmni")
        {
            ConnectionType::Cellular
        } else {
            ConnectionType::None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    /// Cumulative bytes received since boot (monotonic until counter reset).
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    /// Receive rate in bytes/sec (computed from previous sample).
    pub rx_bytes_per_sec: f64,
    pub tx_bytes_per_sec: f64,
    pub connection: ConnectionType,
}

impl NetworkStats {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Wall-clock milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub uptime_secs: u64,
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub battery: BatteryStats,
    pub thermal: ThermalStats,
    pub storage: StorageStats,
    pub network: NetworkStats,
}

impl Snapshot {
    /// All-zero sentinel stamped with `timestamp`.
    pub fn empty(timestamp: u64) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }
}
