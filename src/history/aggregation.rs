// Windowed aggregation over history: clock-aligned bucket arithmetic + pure aggregate logic.
// Queries report the last complete window, never the one in progress.

use crate::health;
use crate::models::{AggregatedRecord, Snapshot, TimeWindow};

/// Collapses a non-empty series into one representative value.
pub type AveragingStrategy = fn(&[f64]) -> f64;

/// Arithmetic mean; 0 for an empty slice.
pub fn simple_average(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.iter().sum::<f64>() / (v.len() as f64)
}

/// Middle value (mean of the two middle values for even lengths); 0 for an empty slice.
pub fn median(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let mut sorted = v.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Start of the window containing `now_ms`, aligned to absolute clock boundaries.
pub fn aligned_window_start(now_ms: u64, window: TimeWindow) -> u64 {
    let d = window.duration_ms();
    (now_ms / d) * d
}

/// Start of the last window that has fully elapsed at `now_ms`; None while the first window is still open.
pub fn previous_complete_window_start(now_ms: u64, window: TimeWindow) -> Option<u64> {
    aligned_window_start(now_ms, window).checked_sub(window.duration_ms())
}

/// Aggregates the last complete `window` before `now_ms`.
pub fn aggregate(history: &[Snapshot], window: TimeWindow, now_ms: u64) -> AggregatedRecord {
    aggregate_with(history, window, now_ms, simple_average)
}

pub fn aggregate_with(
    history: &[Snapshot],
    window: TimeWindow,
    now_ms: u64,
    strategy: AveragingStrategy,
) -> AggregatedRecord {
    match previous_complete_window_start(now_ms, window) {
        Some(start) => {
            aggregate_for_window_with(history, window, start, start + window.duration_ms(), strategy)
        }
        None => AggregatedRecord::empty(window, 0),
    }
}

/// Aggregates snapshots with `start <= timestamp < end`.
pub fn aggregate_for_window(
    history: &[Snapshot],
    window: TimeWindow,
    start: u64,
    end: u64,
) -> AggregatedRecord {
    aggregate_for_window_with(history, window, start, end, simple_average)
}

pub fn aggregate_for_window_with(
    history: &[Snapshot],
    window: TimeWindow,
    start: u64,
    end: u64,
    strategy: AveragingStrategy,
) -> AggregatedRecord {
    let in_window: Vec<&Snapshot> = history
        .iter()
        .filter(|s| s.timestamp >= start && s.timestamp < end)
        .collect();

    let (Some(first), Some(last)) = (
        in_window.iter().copied().min_by_key(|s| s.timestamp),
        in_window.iter().copied().max_by_key(|s| s.timestamp),
    ) else {
        return AggregatedRecord {
            window_end: end,
            ..AggregatedRecord::empty(window, start)
        };
    };

    let cpu: Vec<f64> = in_window.iter().map(|s| s.cpu.usage_percent).collect();
    let memory: Vec<f64> = in_window.iter().map(|s| s.memory.usage_percent).collect();
    let battery: Vec<f64> = in_window.iter().map(|s| s.battery.level_percent).collect();
    let scores: Vec<f64> = in_window
        .iter()
        .map(|s| health::calculate_score(s))
        .collect();

    AggregatedRecord {
        time_window: window,
        window_start: start,
        window_end: end,
        sample_count: in_window.len(),
        cpu_avg: clamp_percent(strategy(&cpu)),
        cpu_min: clamp_percent(min_of(&cpu)),
        cpu_max: clamp_percent(max_of(&cpu)),
        memory_avg: clamp_percent(strategy(&memory)),
        memory_min: clamp_percent(min_of(&memory)),
        memory_max: clamp_percent(max_of(&memory)),
        battery_avg: clamp_percent(strategy(&battery)),
        cpu_temperature: last.thermal.cpu_temperature,
        battery_temperature: last.thermal.battery_temperature,
        health_score_avg: clamp_percent(strategy(&scores)),
        network_rx_bytes_total: last.network.rx_bytes.saturating_sub(first.network.rx_bytes),
        network_tx_bytes_total: last.network.tx_bytes.saturating_sub(first.network.tx_bytes),
    }
}

/// `count` contiguous windows ending at the last complete one, oldest first.
pub fn aggregate_series(
    history: &[Snapshot],
    window: TimeWindow,
    now_ms: u64,
    count: usize,
) -> Vec<AggregatedRecord> {
    aggregate_series_with(history, window, now_ms, count, simple_average)
}

pub fn aggregate_series_with(
    history: &[Snapshot],
    window: TimeWindow,
    now_ms: u64,
    count: usize,
    strategy: AveragingStrategy,
) -> Vec<AggregatedRecord> {
    let d = window.duration_ms();
    let Some(newest_start) = previous_complete_window_start(now_ms, window) else {
        return Vec::new();
    };
    let mut out: Vec<AggregatedRecord> = (0..count as u64)
        .map_while(|i| newest_start.checked_sub(i * d))
        .map(|start| aggregate_for_window_with(history, window, start, start + d, strategy))
        .collect();
    out.reverse();
    out
}

fn min_of(v: &[f64]) -> f64 {
    v.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max_of(v: &[f64]) -> f64 {
    v.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn clamp_percent(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 100.0) }
}
