//! Memory metrics pipeline built on `dumpsys meminfo`.

use crate::collector::error::CollectError;
use crate::collector::parser::parse_meminfo;
use crate::collector::traits::CommandExecutor;
use crate::models::{MemoryMetrics, MemoryReport};

/// Collects memory metrics for `package`.
pub fn collect_memory_metrics<E: CommandExecutor + ?Sized>(
    device: &E,
    package: &str,
) -> Result<MemoryMetrics, CollectError> {
    collect_memory_report(device, package).map(|report| report.metrics)
}

/// Collects memory metrics and the provenance of each field.
pub fn collect_memory_report<E: CommandExecutor + ?Sized>(
    device: &E,
    package: &str,
) -> Result<MemoryReport, CollectError> {
    let args = ["dumpsys", "meminfo", package];
    let output = device
        .execute(&args)
        .map_err(|e| CollectError::command(&args, e))?;

    parse_meminfo(&String::from_utf8_lossy(&output))
}
