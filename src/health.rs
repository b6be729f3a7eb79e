// Weighted health scoring, threshold issue detection and recommendation text.

use crate::models::{HealthIssue, HealthScore, HealthStatus, Snapshot};

const CPU_WEIGHT: f64 = 0.30;
const MEMORY_WEIGHT: f64 = 0.35;
const TEMPERATURE_WEIGHT: f64 = 0.20;
const BATTERY_WEIGHT: f64 = 0.15;

/// CPU temperature at which the temperature factor reaches zero.
const MAX_CPU_TEMPERATURE: f64 = 80.0;

const HIGH_CPU_PERCENT: f64 = 85.0;
const HIGH_MEMORY_PERCENT: f64 = 85.0;
const HIGH_CPU_TEMPERATURE: f64 = 70.0;
const HIGH_BATTERY_TEMPERATURE: f64 = 45.0;
const LOW_BATTERY_PERCENT: f64 = 15.0;
const LOW_STORAGE_PERCENT: f64 = 90.0;
const POOR_PERFORMANCE_PERCENT: f64 = 90.0;

/// Weighted 0-100 score; higher is healthier.
pub fn calculate_score(snapshot: &Snapshot) -> f64 {
    let cpu_factor = 1.0 - percent(snapshot.cpu.usage_percent) / 100.0;
    let memory_factor = 1.0 - percent(snapshot.memory.usage_percent) / 100.0;
    let temperature_factor =
        1.0 - snapshot.thermal.cpu_temperature.clamp(0.0, MAX_CPU_TEMPERATURE) / MAX_CPU_TEMPERATURE;
    let battery_factor = percent(snapshot.battery.level_percent) / 100.0;

    let score = 100.0
        * (CPU_WEIGHT * cpu_factor
            + MEMORY_WEIGHT * memory_factor
            + TEMPERATURE_WEIGHT * temperature_factor
            + BATTERY_WEIGHT * battery_factor);
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

pub fn status_from_score(score: f64) -> HealthStatus {
    if score >= 80.0 {
        HealthStatus::Excellent
    } else if score >= 60.0 {
        HealthStatus::Good
    } else if score >= 40.0 {
        HealthStatus::Warning
    } else {
        HealthStatus::Critical
    }
}

/// Independent threshold checks, in a fixed order.
pub fn detect_issues(snapshot: &Snapshot) -> Vec<HealthIssue> {
    let cpu = snapshot.cpu.usage_percent;
    let memory = snapshot.memory.usage_percent;
    let mut issues = Vec::new();

    if cpu > HIGH_CPU_PERCENT {
        issues.push(HealthIssue::HighCpuUsage);
    }
    if memory > HIGH_MEMORY_PERCENT {
        issues.push(HealthIssue::HighMemoryUsage);
    }
    if snapshot.thermal.cpu_temperature > HIGH_CPU_TEMPERATURE
        || snapshot.thermal.battery_temperature > HIGH_BATTERY_TEMPERATURE
    {
        issues.push(HealthIssue::HighTemperature);
    }
    if snapshot.battery.level_percent < LOW_BATTERY_PERCENT {
        issues.push(HealthIssue::LowBattery);
    }
    if snapshot.thermal.throttling {
        issues.push(HealthIssue::ThermalThrottling);
    }
    if snapshot.storage.usage_percent > LOW_STORAGE_PERCENT {
        issues.push(HealthIssue::LowStorage);
    }
    if cpu > POOR_PERFORMANCE_PERCENT && memory > POOR_PERFORMANCE_PERCENT {
        issues.push(HealthIssue::PoorPerformance);
    }
    issues
}

pub fn generate_recommendations(issues: &[HealthIssue]) -> Vec<String> {
    issues
        .iter()
        .flat_map(|issue| recommendations_for(*issue).iter())
        .map(|s| (*s).to_string())
        .collect()
}

fn recommendations_for(issue: HealthIssue) -> &'static [&'static str] {
    match issue {
        HealthIssue::HighCpuUsage => &[
            "Close CPU-intensive applications",
            "Check for runaway background processes",
        ],
        HealthIssue::HighMemoryUsage => &[
            "Close unused applications to free memory",
            "Clear application caches",
        ],
        HealthIssue::HighTemperature => &[
            "Let the device cool down",
            "Avoid heavy workloads while charging",
        ],
        HealthIssue::LowBattery => &["Connect the charger", "Enable power saving mode"],
        HealthIssue::ThermalThrottling => {
            &["Reduce workload; the CPU is running at reduced speed to cool down"]
        }
        HealthIssue::LowStorage => &[
            "Delete unused files or applications",
            "Move media to external storage",
        ],
        HealthIssue::PoorPerformance => &["Restart the device to recover responsiveness"],
    }
}

/// Full evaluation of one snapshot.
pub fn evaluate(snapshot: &Snapshot) -> HealthScore {
    let score = calculate_score(snapshot);
    let issues = detect_issues(snapshot);
    let recommendations = generate_recommendations(&issues);
    HealthScore::from_clamped(
        score,
        status_from_score(score),
        issues,
        recommendations,
        snapshot.timestamp,
    )
}

fn percent(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}
