// Model serialization tests (JSON camelCase, tagged events, sysfs parsing)

use pulsemon::models::*;

#[test]
fn test_snapshot_serialization_camel_case() {
    let mut snapshot = Snapshot::empty(1_700_000_000_000);
    snapshot.cpu.usage_percent = 12.5;
    snapshot.network.rx_bytes_per_sec = 2048.0;
    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"usagePercent\":12.5"));
    assert!(json.contains("\"rxBytesPerSec\""));
    assert!(json.contains("\"uptimeSecs\""));
    let back: Snapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
}

#[test]
fn test_empty_sentinels_are_zeroed() {
    let s = Snapshot::empty(42);
    assert_eq!(s.timestamp, 42);
    assert_eq!(s.cpu.usage_percent, 0.0);
    assert!(s.cpu.frequencies_mhz.is_empty());
    assert_eq!(s.battery.status, BatteryStatus::Unknown);
    assert_eq!(s.network.connection, ConnectionType::None);
    assert!(!s.thermal.throttling);
}

#[test]
fn test_unknown_enum_strings_deserialize_to_fallback() {
    let status: BatteryStatus = serde_json::from_str("\"wireless\"").unwrap();
    assert_eq!(status, BatteryStatus::Unknown);
    let connection: ConnectionType = serde_json::from_str("\"bluetooth\"").unwrap();
    assert_eq!(connection, ConnectionType::None);
    let charging: BatteryStatus = serde_json::from_str("\"not_charging\"").unwrap();
    assert_eq!(charging, BatteryStatus::NotCharging);
}

#[test]
fn test_battery_sysfs_strings() {
    assert_eq!(BatteryStatus::from_sysfs("Charging\n"), BatteryStatus::Charging);
    assert_eq!(BatteryStatus::from_sysfs("Not charging"), BatteryStatus::NotCharging);
    assert_eq!(BatteryStatus::from_sysfs("???"), BatteryStatus::Unknown);
    assert_eq!(BatteryHealth::from_sysfs("Over voltage"), BatteryHealth::OverVoltage);
    assert_eq!(BatteryHealth::from_sysfs("Good"), BatteryHealth::Good);
    assert_eq!(BatteryHealth::from_sysfs(""), BatteryHealth::Unknown);
}

#[test]
fn test_connection_type_from_interface_name() {
    assert_eq!(ConnectionType::from_interface_name("wlan0"), ConnectionType::Wifi);
    assert_eq!(ConnectionType::from_interface_name("wlp2s0"), ConnectionType::Wifi);
    assert_eq!(ConnectionType::from_interface_name("enp3s0"), ConnectionType::Ethernet);
    assert_eq!(ConnectionType::from_interface_name("eth0"), ConnectionType::Ethernet);
    assert_eq!(ConnectionType::from_interface_name("rmnet_data0"), ConnectionType::Cellular);
    assert_eq!(ConnectionType::from_interface_name("docker0"), ConnectionType::None);
}

#[test]
fn test_time_window_parse_and_durations() {
    assert_eq!("five_minutes".parse::<TimeWindow>().unwrap(), TimeWindow::FiveMinutes);
    assert_eq!(" one_hour ".parse::<TimeWindow>().unwrap(), TimeWindow::OneHour);
    assert!("fortnight".parse::<TimeWindow>().is_err());
    assert_eq!(TimeWindow::OneMinute.duration_ms(), 60_000);
    assert_eq!(TimeWindow::FifteenMinutes.duration_ms(), 900_000);
    assert_eq!(TimeWindow::OneDay.duration_ms(), 86_400_000);
    for w in TimeWindow::ALL {
        assert_eq!(w.to_string().parse::<TimeWindow>().unwrap(), w);
    }
}

#[test]
fn test_aggregated_record_serialization() {
    let record = AggregatedRecord::empty(TimeWindow::OneHour, 3_600_000);
    assert!(record.is_empty());
    assert_eq!(record.window_end, 7_200_000);
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["timeWindow"], "one_hour");
    assert_eq!(json["sampleCount"], 0);
    assert!(json.get("networkRxBytesTotal").is_some());
}

#[test]
fn test_health_status_ordering_and_wire_names() {
    assert!(HealthStatus::Critical < HealthStatus::Warning);
    assert!(HealthStatus::Good < HealthStatus::Excellent);
    assert_eq!(
        serde_json::to_string(&HealthIssue::HighCpuUsage).unwrap(),
        "\"HIGH_CPU_USAGE\""
    );
    assert_eq!(serde_json::to_string(&HealthStatus::Good).unwrap(), "\"GOOD\"");
}

#[test]
fn test_health_issue_descriptions_are_distinct() {
    let all = [
        HealthIssue::HighCpuUsage,
        HealthIssue::HighMemoryUsage,
        HealthIssue::HighTemperature,
        HealthIssue::LowBattery,
        HealthIssue::ThermalThrottling,
        HealthIssue::LowStorage,
        HealthIssue::PoorPerformance,
    ];
    let descriptions: std::collections::HashSet<_> = all.iter().map(|i| i.description()).collect();
    assert_eq!(descriptions.len(), all.len());
}

#[test]
fn test_peak_event_is_tagged_by_kind() {
    let event = PeakEvent::FrameDrop {
        fps: 20.0,
        delta: 40.0,
        previous_fps: 60.0,
    };
    let json = serde_json::to_value(event).unwrap();
    assert_eq!(json["kind"], "frame_drop");
    assert_eq!(json["previousFps"], 60.0);

    let back: PeakEvent =
        serde_json::from_str(r#"{"kind":"critical_jank","fps":12.0,"sincePreviousMs":1500}"#)
            .unwrap();
    assert_eq!(
        back,
        PeakEvent::CriticalJank {
            fps: 12.0,
            since_previous_ms: 1500
        }
    );
    assert_eq!(back.fps(), 12.0);
}

#[test]
fn test_frame_metrics_serialization_camel_case() {
    let metrics = FrameMetrics {
        current_fps: 60.0,
        jank_count: 2,
        ..FrameMetrics::default()
    };
    let json = serde_json::to_string(&metrics).unwrap();
    assert!(json.contains("\"currentFps\":60.0"));
    assert!(json.contains("\"jankCount\":2"));
}
