//! CPU metrics pipeline.
//!
//! Cumulative user/system time comes from `/proc/[pid]/stat`, which is
//! always present. The instantaneous usage percentage comes from a single
//! `top` sample, which is best effort: when it fails the usage stays at zero
//! and is left out of the provenance.

use tracing::debug;

use crate::collector::error::CollectError;
use crate::collector::parser::{parse_proc_stat, parse_top_cpu_usage};
use crate::collector::process::{ProcessId, locate_process};
use crate::collector::traits::CommandExecutor;
use crate::models::{CpuField, CpuMetrics, CpuReport, Origin};

/// Collects CPU metrics for the process running `package`.
pub fn collect_cpu_metrics<E: CommandExecutor + ?Sized>(
    device: &E,
    package: &str,
) -> Result<CpuMetrics, CollectError> {
    let pid = locate_process(device, package)?;
    collect_cpu_report(device, &pid).map(|report| report.metrics)
}

/// Collects CPU metrics for an already resolved process.
pub fn collect_cpu_metrics_for_pid<E: CommandExecutor + ?Sized>(
    device: &E,
    pid: &ProcessId,
) -> Result<CpuMetrics, CollectError> {
    collect_cpu_report(device, pid).map(|report| report.metrics)
}

/// Collects CPU metrics and the provenance of each field.
pub fn collect_cpu_report<E: CommandExecutor + ?Sized>(
    device: &E,
    pid: &ProcessId,
) -> Result<CpuReport, CollectError> {
    let stat_path = format!("/proc/{}/stat", pid);
    let args = ["cat", stat_path.as_str()];
    let stat = device
        .execute(&args)
        .map_err(|e| CollectError::command(&args, e))?;

    let times = parse_proc_stat(&String::from_utf8_lossy(&stat))?;

    let mut report = CpuReport {
        metrics: times.to_cpu_metrics()?,
        ..CpuReport::default()
    };
    report.provenance.record(CpuField::UserTime, Origin::ProcStat);
    report.provenance.record(CpuField::SystemTime, Origin::ProcStat);

    if let Some(usage) = sample_usage(device, pid) {
        report.metrics.usage = usage;
        report.provenance.record(CpuField::Usage, Origin::Top);
    }

    Ok(report)
}

/// Takes one non-averaged `top` sample for `pid`.
fn sample_usage<E: CommandExecutor + ?Sized>(device: &E, pid: &ProcessId) -> Option<f64> {
    let args = ["top", "-b", "-n", "1", "-p", pid.as_str()];
    let output = match device.execute(&args) {
        Ok(output) => output,
        Err(e) => {
            debug!(pid = %pid, error = %e, "top unavailable, cpu usage unknown");
            return None;
        }
    };

    let usage = parse_top_cpu_usage(&String::from_utf8_lossy(&output));
    if usage.is_none() {
        debug!(pid = %pid, "no percentage in top output, cpu usage unknown");
    }
    usage
}
