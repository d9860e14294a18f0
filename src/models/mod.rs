//! Data models shared by the collectors and the sampling binary.

mod metrics;
mod provenance;
mod snapshot;

pub use metrics::{BatteryMetrics, CpuMetrics, FpsMetrics, MemoryMetrics, NetworkMetrics};
pub use provenance::{CpuField, CpuReport, MemoryField, MemoryReport, Origin, Provenance};
pub use snapshot::PerformanceSnapshot;
