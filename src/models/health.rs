// Health score value object. The score range is enforced at construction.

use serde::{Deserialize, Serialize};

use crate::error::MetricsError;

/// Ordered status tiers, worst first so `Ord` follows severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Critical,
    Warning,
    Good,
    Excellent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthIssue {
    HighCpuUsage,
    HighMemoryUsage,
    HighTemperature,
    LowBattery,
    ThermalThrottling,
    LowStorage,
    PoorPerformance,
}

impl HealthIssue {
    pub fn description(self) -> &'static str {
        match self {
            HealthIssue::HighCpuUsage => "CPU usage above 85%",
            HealthIssue::HighMemoryUsage => "Memory usage above 85%",
            HealthIssue::HighTemperature => "Device temperature is high",
            HealthIssue::LowBattery => "Battery below 15%",
            HealthIssue::ThermalThrottling => "CPU is being thermally throttled",
            HealthIssue::LowStorage => "Storage above 90% full",
            HealthIssue::PoorPerformance => "CPU and memory both above 90%",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawHealthScore")]
pub struct HealthScore {
    score: f64,
    status: HealthStatus,
    issues: Vec<HealthIssue>,
    recommendations: Vec<String>,
    timestamp: u64,
}

/// Unchecked wire form; deserialization goes through `HealthScore::new`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHealthScore {
    score: f64,
    status: HealthStatus,
    issues: Vec<HealthIssue>,
    recommendations: Vec<String>,
    timestamp: u64,
}

impl TryFrom<RawHealthScore> for HealthScore {
    type Error = MetricsError;

    fn try_from(raw: RawHealthScore) -> Result<Self, Self::Error> {
        HealthScore::new(
            raw.score,
            raw.status,
            raw.issues,
            raw.recommendations,
            raw.timestamp,
        )
    }
}

impl HealthScore {
    /// Fails with `InvalidScore` when `score` is NaN or outside [0, 100].
    pub fn new(
        score: f64,
        status: HealthStatus,
        issues: Vec<HealthIssue>,
        recommendations: Vec<String>,
        timestamp: u64,
    ) -> Result<Self, MetricsError> {
        if !(0.0..=100.0).contains(&score) {
            return Err(MetricsError::InvalidScore(score));
        }
        Ok(Self {
            score,
            status,
            issues,
            recommendations,
            timestamp,
        })
    }

    /// Scorer path: the score is forced into range (NaN becomes 0) instead of rejected.
    pub(crate) fn from_clamped(
        score: f64,
        status: HealthStatus,
        issues: Vec<HealthIssue>,
        recommendations: Vec<String>,
        timestamp: u64,
    ) -> Self {
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 100.0)
        };
        Self {
            score,
            status,
            issues,
            recommendations,
            timestamp,
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn status(&self) -> HealthStatus {
        self.status
    }

    pub fn issues(&self) -> &[HealthIssue] {
        &self.issues
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// True for GOOD and EXCELLENT.
    pub fn is_healthy(&self) -> bool {
        self.status >= HealthStatus::Good
    }
}
