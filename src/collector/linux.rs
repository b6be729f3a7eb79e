// Linux-specific helpers: power_supply battery, cpufreq limits, thermal throttle counters.

use crate::models::{BatteryHealth, BatteryStats, BatteryStatus};

/// Reads the first power supply of type "Battery" under /sys/class/power_supply.
/// Ok(None) when the machine has no battery.
pub(super) fn read_battery() -> anyhow::Result<Option<BatteryStats>> {
    #[cfg(target_os = "linux")]
    {
        let dir = match std::fs::read_dir("/sys/class/power_supply") {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        for entry in dir {
            let path = entry?.path();
            let kind = read_trimmed(&path.join("type")).unwrap_or_default();
            if kind != "Battery" {
                continue;
            }
            let level_percent = read_trimmed(&path.join("capacity"))
                .and_then(|v| v.parse::<f64>().ok())
                .ok_or_else(|| anyhow::anyhow!("{}: capacity unreadable", path.display()))?;
            // power_supply reports temperature in tenths of a degree Celsius
            let temperature = read_trimmed(&path.join("temp"))
                .and_then(|v| v.parse::<f64>().ok())
                .map(|t| t / 10.0)
                .unwrap_or(0.0);
            let status = read_trimmed(&path.join("status"))
                .map(|s| BatteryStatus::from_sysfs(&s))
                .unwrap_or_default();
            let health = read_trimmed(&path.join("health"))
                .map(|s| BatteryHealth::from_sysfs(&s))
                .unwrap_or_default();
            return Ok(Some(BatteryStats {
                level_percent: level_percent.clamp(0.0, 100.0),
                temperature,
                status,
                health,
            }));
        }
        Ok(None)
    }
    #[cfg(not(target_os = "linux"))]
    Ok(None)
}

/// cpuinfo_max_freq of cpu0 in MHz, or 0 if unavailable.
pub(super) fn read_max_cpu_frequency_mhz() -> u64 {
    #[cfg(target_os = "linux")]
    {
        let path = std::path::Path::new("/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq");
        if let Some(khz) = read_trimmed(path).and_then(|v| v.parse::<u64>().ok()) {
            return khz / 1000;
        }
    }
    0
}

/// Sum of per-core thermal throttle events since boot (x86 only), or None if not exposed.
pub(super) fn read_throttle_count() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let dir = std::fs::read_dir("/sys/devices/system/cpu").ok()?;
        let mut total: Option<u64> = None;
        for entry in dir.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let Some(index) = name.strip_prefix("cpu") else {
                continue;
            };
            if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            let path = entry.path().join("thermal_throttle/core_throttle_count");
            if let Some(n) = read_trimmed(&path).and_then(|v| v.parse::<u64>().ok()) {
                total = Some(total.unwrap_or(0) + n);
            }
        }
        total
    }
    #[cfg(not(target_os = "linux"))]
    None
}

#[cfg(target_os = "linux")]
fn read_trimmed(path: &std::path::Path) -> Option<String> {
    let v = std::fs::read_to_string(path).ok()?;
    let v = v.trim();
    if v.is_empty() {
        return None;
    }
    Some(v.to_string())
}
