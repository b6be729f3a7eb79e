// Aggregation tests: window alignment, empty windows, avg/min/max, network deltas, series

mod common;

use common::{snapshot, with_network};
use pulsemon::health;
use pulsemon::history::aggregation::*;
use pulsemon::models::*;

const MIN: u64 = 60_000;

/// 14:32:45 on an arbitrary day, as epoch millis.
const T_14_32_45: u64 = (14 * 60 + 32) * MIN + 45_000;

#[test]
fn aligned_window_start_floors_to_clock_boundary() {
    assert_eq!(
        aligned_window_start(T_14_32_45, TimeWindow::FiveMinutes),
        (14 * 60 + 30) * MIN
    );
    assert_eq!(
        aligned_window_start(T_14_32_45, TimeWindow::OneHour),
        14 * 60 * MIN
    );
    assert_eq!(aligned_window_start(T_14_32_45, TimeWindow::OneDay), 0);
}

#[test]
fn previous_complete_window_skips_in_progress_window() {
    assert_eq!(
        previous_complete_window_start(T_14_32_45, TimeWindow::FiveMinutes),
        Some((14 * 60 + 25) * MIN)
    );
    assert_eq!(
        previous_complete_window_start(MIN, TimeWindow::OneMinute),
        Some(0)
    );
}

#[test]
fn first_window_is_never_reported_while_open() {
    let history = vec![snapshot(5_000, 50.0, 50.0, 40.0, 80.0)];
    assert_eq!(
        previous_complete_window_start(30_000, TimeWindow::OneMinute),
        None
    );
    let out = aggregate(&history, TimeWindow::OneMinute, 30_000);
    assert!(out.is_empty());
    assert_eq!(out.cpu_avg, 0.0);
    assert!(aggregate_series(&history, TimeWindow::OneMinute, 30_000, 5).is_empty());
}

#[test]
fn aggregate_never_reports_in_progress_window() {
    // Sample inside the current [14:30, 14:35) window only
    let history = vec![snapshot((14 * 60 + 31) * MIN, 50.0, 50.0, 40.0, 80.0)];
    let out = aggregate(&history, TimeWindow::FiveMinutes, T_14_32_45);
    assert_eq!(out.window_start, (14 * 60 + 25) * MIN);
    assert_eq!(out.window_end, (14 * 60 + 30) * MIN);
    assert_eq!(out.sample_count, 0);
}

#[test]
fn aggregate_empty_history_is_all_zero() {
    for window in TimeWindow::ALL {
        let out = aggregate(&[], window, T_14_32_45);
        assert_eq!(out.sample_count, 0);
        assert!(out.is_empty());
        assert_eq!(out.window_end - out.window_start, window.duration_ms());
        assert_eq!(out.cpu_avg, 0.0);
        assert_eq!(out.cpu_min, 0.0);
        assert_eq!(out.cpu_max, 0.0);
        assert_eq!(out.memory_avg, 0.0);
        assert_eq!(out.battery_avg, 0.0);
        assert_eq!(out.cpu_temperature, 0.0);
        assert_eq!(out.health_score_avg, 0.0);
        assert_eq!(out.network_rx_bytes_total, 0);
        assert_eq!(out.network_tx_bytes_total, 0);
    }
}

#[test]
fn aggregate_computes_avg_min_max_and_last_temperature() {
    let start = 10 * MIN;
    let history = vec![
        snapshot(start, 10.0, 40.0, 50.0, 90.0),
        snapshot(start + 1_000, 20.0, 50.0, 65.0, 80.0),
        snapshot(start + 2_000, 30.0, 60.0, 45.0, 70.0),
        // Next window; excluded
        snapshot(start + MIN, 99.0, 99.0, 99.0, 1.0),
    ];
    let out = aggregate_for_window(&history, TimeWindow::OneMinute, start, start + MIN);
    assert_eq!(out.sample_count, 3);
    assert_eq!(out.cpu_avg, 20.0);
    assert_eq!(out.cpu_min, 10.0);
    assert_eq!(out.cpu_max, 30.0);
    assert_eq!(out.memory_avg, 50.0);
    assert_eq!(out.memory_min, 40.0);
    assert_eq!(out.memory_max, 60.0);
    assert_eq!(out.battery_avg, 80.0);
    assert_eq!(out.cpu_temperature, 45.0);

    let expected_health = history[..3]
        .iter()
        .map(health::calculate_score)
        .sum::<f64>()
        / 3.0;
    assert!((out.health_score_avg - expected_health).abs() < 1e-9);
}

#[test]
fn aggregate_network_totals_are_first_to_last_delta() {
    let start = 10 * MIN;
    let base = snapshot(start, 0.0, 0.0, 0.0, 100.0);
    let history = vec![
        with_network(base.clone(), 1000, 500),
        with_network(snapshot(start + 1_000, 0.0, 0.0, 0.0, 100.0), 1200, 600),
        with_network(snapshot(start + 2_000, 0.0, 0.0, 0.0, 100.0), 1500, 800),
    ];
    let out = aggregate_for_window(&history, TimeWindow::OneMinute, start, start + MIN);
    assert_eq!(out.network_rx_bytes_total, 500);
    assert_eq!(out.network_tx_bytes_total, 300);
}

#[test]
fn aggregate_network_counter_reset_clamps_to_zero() {
    let start = 10 * MIN;
    let history = vec![
        with_network(snapshot(start, 0.0, 0.0, 0.0, 100.0), 1000, 500),
        with_network(snapshot(start + 1_000, 0.0, 0.0, 0.0, 100.0), 1500, 800),
        with_network(snapshot(start + 2_000, 0.0, 0.0, 0.0, 100.0), 200, 100),
    ];
    let out = aggregate_for_window(&history, TimeWindow::OneMinute, start, start + MIN);
    assert_eq!(out.network_rx_bytes_total, 0);
    assert_eq!(out.network_tx_bytes_total, 0);
}

#[test]
fn aggregate_uses_timestamp_order_not_slice_order() {
    let start = 10 * MIN;
    let history = vec![
        with_network(snapshot(start + 2_000, 0.0, 0.0, 55.0, 100.0), 1500, 800),
        with_network(snapshot(start, 0.0, 0.0, 35.0, 100.0), 1000, 500),
    ];
    let out = aggregate_for_window(&history, TimeWindow::OneMinute, start, start + MIN);
    assert_eq!(out.network_rx_bytes_total, 500);
    assert_eq!(out.cpu_temperature, 55.0);
}

#[test]
fn aggregate_clamps_out_of_range_percentages() {
    let start = 10 * MIN;
    let history = vec![snapshot(start, 150.0, -20.0, 0.0, 100.0)];
    let out = aggregate_for_window(&history, TimeWindow::OneMinute, start, start + MIN);
    assert_eq!(out.cpu_avg, 100.0);
    assert_eq!(out.cpu_max, 100.0);
    assert_eq!(out.memory_avg, 0.0);
    assert_eq!(out.memory_min, 0.0);
}

#[test]
fn aggregate_with_median_strategy() {
    let start = 10 * MIN;
    let history = vec![
        snapshot(start, 10.0, 0.0, 0.0, 100.0),
        snapshot(start + 1, 20.0, 0.0, 0.0, 100.0),
        snapshot(start + 2, 90.0, 0.0, 0.0, 100.0),
    ];
    let out = aggregate_with(&history, TimeWindow::OneMinute, start + MIN + 5, median);
    assert_eq!(out.window_start, start);
    assert_eq!(out.cpu_avg, 20.0);
    assert_eq!(out.cpu_max, 90.0);
}

#[test]
fn averaging_strategies_handle_empty_input() {
    assert_eq!(simple_average(&[]), 0.0);
    assert_eq!(median(&[]), 0.0);
    assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
}

#[test]
fn aggregate_series_is_contiguous_and_ends_at_last_complete_window() {
    let history = vec![
        snapshot((14 * 60 + 16) * MIN, 10.0, 0.0, 0.0, 100.0),
        snapshot((14 * 60 + 27) * MIN, 30.0, 0.0, 0.0, 100.0),
    ];
    let series = aggregate_series(&history, TimeWindow::FiveMinutes, T_14_32_45, 3);
    let starts: Vec<u64> = series.iter().map(|r| r.window_start).collect();
    assert_eq!(
        starts,
        vec![
            (14 * 60 + 15) * MIN,
            (14 * 60 + 20) * MIN,
            (14 * 60 + 25) * MIN
        ]
    );
    assert!(series.windows(2).all(|w| w[0].window_end == w[1].window_start));
    assert_eq!(series[0].sample_count, 1);
    assert_eq!(series[1].sample_count, 0);
    assert_eq!(series[2].cpu_avg, 30.0);
}

#[test]
fn aggregate_series_stops_at_epoch() {
    let series = aggregate_series(&[], TimeWindow::OneMinute, 3 * MIN + 1, 10);
    assert_eq!(series.len(), 3);
    assert_eq!(series[0].window_start, 0);
}
