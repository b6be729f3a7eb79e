// Aggregated record: one clock-aligned window [window_start, window_end).
// Scalars carry avg (and min/max for CPU and memory); temperature is the last reading.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const MS_PER_MINUTE: u64 = 60_000;

/// Fixed window sizes for aggregation; all are aligned to absolute clock boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    OneHour,
    OneDay,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 5] = [
        TimeWindow::OneMinute,
        TimeWindow::FiveMinutes,
        TimeWindow::FifteenMinutes,
        TimeWindow::OneHour,
        TimeWindow::OneDay,
    ];

    pub const fn duration_ms(self) -> u64 {
        match self {
            TimeWindow::OneMinute => MS_PER_MINUTE,
            TimeWindow::FiveMinutes => 5 * MS_PER_MINUTE,
            TimeWindow::FifteenMinutes => 15 * MS_PER_MINUTE,
            TimeWindow::OneHour => 60 * MS_PER_MINUTE,
            TimeWindow::OneDay => 24 * 60 * MS_PER_MINUTE,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TimeWindow::OneMinute => "one_minute",
            TimeWindow::FiveMinutes => "five_minutes",
            TimeWindow::FifteenMinutes => "fifteen_minutes",
            TimeWindow::OneHour => "one_hour",
            TimeWindow::OneDay => "one_day",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeWindow::ALL
            .into_iter()
            .find(|w| w.as_str() == s.trim())
            .ok_or_else(|| anyhow::anyhow!("unknown time window: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedRecord {
    pub time_window: TimeWindow,
    pub window_start: u64,
    pub window_end: u64,
    pub sample_count: usize,
    pub cpu_avg: f64,
    pub cpu_min: f64,
    pub cpu_max: f64,
    pub memory_avg: f64,
    pub memory_min: f64,
    pub memory_max: f64,
    pub battery_avg: f64,
    /// Last CPU temperature observed in the window (not averaged).
    pub cpu_temperature: f64,
    pub battery_temperature: f64,
    pub health_score_avg: f64,
    /// Bytes received during the window; 0 when the counter went backwards.
    pub network_rx_bytes_total: u64,
    pub network_tx_bytes_total: u64,
}

impl AggregatedRecord {
    /// Window with no samples: every numeric field zero.
    pub fn empty(time_window: TimeWindow, window_start: u64) -> Self {
        Self {
            time_window,
            window_start,
            window_end: window_start + time_window.duration_ms(),
            sample_count: 0,
            cpu_avg: 0.0,
            cpu_min: 0.0,
            cpu_max: 0.0,
            memory_avg: 0.0,
            memory_min: 0.0,
            memory_max: 0.0,
            battery_avg: 0.0,
            cpu_temperature: 0.0,
            battery_temperature: 0.0,
            health_score_avg: 0.0,
            network_rx_bytes_total: 0,
            network_tx_bytes_total: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }
}
