// Value objects shared by the sampling pipeline and the frame analyzer.

mod aggregation;
mod frame;
mod health;
mod snapshot;

pub use aggregation::{AggregatedRecord, TimeWindow};
pub use frame::{FrameMetrics, FrameStatistics, PeakEvent};
pub use health::{HealthIssue, HealthScore, HealthStatus};
pub use snapshot::{
    BatteryHealth, BatteryStats, BatteryStatus, ConnectionType, CpuStats, MemoryStats,
    NetworkStats, Snapshot, StorageStats, ThermalStats,
};
