//! Composite snapshot of one sampling pass for one package.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metrics::{BatteryMetrics, CpuMetrics, FpsMetrics, MemoryMetrics, NetworkMetrics};

/// Point-in-time performance data for a package on a device.
///
/// `cpu` and `memory` are computed by this crate. `fps`, `battery` and
/// `network` are owned by other collectors and default to zero here.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    pub timestamp: DateTime<Utc>,
    pub device_id: String,
    pub package_name: String,
    pub cpu: CpuMetrics,
    pub memory: MemoryMetrics,
    pub fps: FpsMetrics,
    pub battery: BatteryMetrics,
    pub network: NetworkMetrics,
}

impl PerformanceSnapshot {
    /// Creates an empty snapshot stamped with `timestamp`.
    pub fn new(
        timestamp: DateTime<Utc>,
        device_id: impl Into<String>,
        package_name: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            device_id: device_id.into(),
            package_name: package_name.into(),
            cpu: CpuMetrics::default(),
            memory: MemoryMetrics::default(),
            fps: FpsMetrics::default(),
            battery: BatteryMetrics::default(),
            network: NetworkMetrics::default(),
        }
    }
}
