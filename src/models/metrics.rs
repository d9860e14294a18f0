//! Per-process metric records produced by one sampling pass.
//!
//! Field names on the wire are camelCase to match the JSON consumed by
//! downstream aggregators. Every numeric value is non-negative; a value that
//! could not be measured stays at zero; see [`super::Provenance`] for telling
//! the two apart.

use serde::{Deserialize, Serialize};

/// CPU usage of a single process.
///
/// Sources: `/proc/[pid]/stat` (cumulative times), `top` (instantaneous usage).
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct CpuMetrics {
    /// Instantaneous CPU usage in percent.
    /// Source: `top -b -n 1 -p [pid]`, zero when unavailable.
    pub usage: f64,

    /// Cumulative user-mode CPU time since process start (ms).
    /// Source: `/proc/[pid]/stat` utime * 1000 / CLK_TCK
    #[serde(rename = "userTime")]
    pub user_time_ms: i64,

    /// Cumulative kernel-mode CPU time since process start (ms).
    /// Source: `/proc/[pid]/stat` stime * 1000 / CLK_TCK
    #[serde(rename = "systemTime")]
    pub system_time_ms: i64,
}

/// Memory usage of a single process.
///
/// Source: `dumpsys meminfo [package]`
///
/// All values are in kilobytes (KB).
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MemoryMetrics {
    /// Proportional set size (KB). The only mandatory field.
    /// Source: `TOTAL PSS:` line
    pub pss: i64,

    /// Managed heap size (KB).
    /// Source: `Dalvik Heap` row, column "Heap Size", or a `Heap Size:` summary line
    pub heap_size: i64,

    /// Managed heap allocated (KB).
    /// Source: `Dalvik Heap` row, column "Heap Alloc", or a `Heap Alloc:` summary line
    pub heap_alloc: i64,

    /// Native heap PSS (KB).
    /// Source: `Native Heap` row, first column
    pub native_heap: i64,
}

/// Frame rendering statistics. Filled by an external collector.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FpsMetrics {
    pub current: f64,
    pub average: f64,
    pub jank_count: i32,
    /// Milliseconds per frame.
    pub frame_time: Vec<i64>,
}

/// Battery drain. Filled by an external collector.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct BatteryMetrics {
    #[serde(rename = "powerMAh")]
    pub power_mah: f64,
    pub percent: f64,
}

/// Network traffic counters. Filled by an external collector.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMetrics {
    pub rx_bytes: i64,
    pub tx_bytes: i64,
    pub rx_packets: i64,
    pub tx_packets: i64,
}
