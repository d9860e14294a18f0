//! One sampling pass: locate the process, collect CPU and memory, and
//! assemble a `PerformanceSnapshot`.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, warn};

use crate::collector::cpu::collect_cpu_report;
use crate::collector::error::CollectError;
use crate::collector::memory::collect_memory_report;
use crate::collector::process::locate_process;
use crate::collector::traits::CommandExecutor;
use crate::models::{CpuReport, MemoryReport, PerformanceSnapshot};

/// Timing information for each phase of a pass.
#[derive(Debug, Clone, Default)]
pub struct SampleTiming {
    /// Total pass time.
    pub total: Duration,
    /// Time to resolve the process id.
    pub locate: Duration,
    /// Time to collect CPU metrics (stat + top).
    pub cpu: Duration,
    /// Time to collect memory metrics.
    pub memory: Duration,
}

/// Metric families computed by a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cpu,
    Memory,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Cpu => f.write_str("cpu"),
            Metric::Memory => f.write_str("memory"),
        }
    }
}

/// A metric that could not be produced in a pass.
#[derive(Debug)]
pub struct MetricFailure {
    pub metric: Metric,
    pub error: CollectError,
}

/// Result of a sampling pass.
///
/// A failed metric is left zeroed in `snapshot` and listed in `failures`;
/// the other metric is still reported.
#[derive(Debug)]
pub struct SampleReport {
    pub snapshot: PerformanceSnapshot,
    pub cpu: Option<CpuReport>,
    pub memory: Option<MemoryReport>,
    pub failures: Vec<MetricFailure>,
}

impl SampleReport {
    /// Whether every metric family was collected.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The error for `metric`, if it failed.
    pub fn failure(&self, metric: Metric) -> Option<&CollectError> {
        self.failures
            .iter()
            .find(|f| f.metric == metric)
            .map(|f| &f.error)
    }
}

/// Runs sampling passes against one device.
pub struct Sampler<E: CommandExecutor> {
    device: E,
    /// Timing information from the last `sample` call.
    last_timing: Option<SampleTiming>,
}

impl<E: CommandExecutor> Sampler<E> {
    pub fn new(device: E) -> Self {
        Self {
            device,
            last_timing: None,
        }
    }

    pub fn device(&self) -> &E {
        &self.device
    }

    /// Returns timing information from the last pass.
    pub fn last_timing(&self) -> Option<&SampleTiming> {
        self.last_timing.as_ref()
    }

    /// Runs one pass for `package`.
    ///
    /// Fails only when the process cannot be located; per-metric failures
    /// are reported in [`SampleReport::failures`].
    pub fn sample(&mut self, package: &str) -> Result<SampleReport, CollectError> {
        let total_start = Instant::now();
        let mut timing = SampleTiming::default();
        let mut failures = Vec::new();

        let mut snapshot = PerformanceSnapshot::new(Utc::now(), self.device.device_id(), package);

        let start = Instant::now();
        let pid = locate_process(&self.device, package)?;
        timing.locate = start.elapsed();
        debug!(package, pid = %pid, "process located");

        let start = Instant::now();
        let cpu = match collect_cpu_report(&self.device, &pid) {
            Ok(report) => {
                snapshot.cpu = report.metrics;
                Some(report)
            }
            Err(error) => {
                warn!(package, pid = %pid, %error, "cpu metrics unavailable");
                failures.push(MetricFailure {
                    metric: Metric::Cpu,
                    error,
                });
                None
            }
        };
        timing.cpu = start.elapsed();

        let start = Instant::now();
        let memory = match collect_memory_report(&self.device, package) {
            Ok(report) => {
                snapshot.memory = report.metrics;
                Some(report)
            }
            Err(error) => {
                warn!(package, %error, "memory metrics unavailable");
                failures.push(MetricFailure {
                    metric: Metric::Memory,
                    error,
                });
                None
            }
        };
        timing.memory = start.elapsed();

        timing.total = total_start.elapsed();
        self.last_timing = Some(timing);

        Ok(SampleReport {
            snapshot,
            cpu,
            memory,
            failures,
        })
    }
}
