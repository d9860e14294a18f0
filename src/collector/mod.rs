//! Per-process metrics collection over a device command channel.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Sampler                            │
//! │  ┌────────────────┐ ┌──────────────────┐ ┌────────────────┐ │
//! │  │ locate_process │ │ collect_cpu_*    │ │collect_memory_*│ │
//! │  │  - pidof       │ │  - /proc/pid/stat│ │  - dumpsys     │ │
//! │  └───────┬────────┘ │  - top           │ │    meminfo     │ │
//! │          │          └────────┬─────────┘ └───────┬────────┘ │
//! │          └───────────────────┼───────────────────┘          │
//! │                              │        parser (pure fns)     │
//! │                     ┌────────▼────────┐                     │
//! │                     │ CommandExecutor │ (trait)             │
//! │                     └────────┬────────┘                     │
//! └──────────────────────────────┼──────────────────────────────┘
//!                       ┌────────┴────────┐
//!                ┌──────▼──────┐   ┌──────▼───────┐
//!                │ AdbExecutor │   │ MockExecutor │
//!                │ (adb shell) │   │  (Testing)   │
//!                └─────────────┘   └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use devperf::collector::{AdbExecutor, Sampler};
//!
//! let adb = AdbExecutor::new("adb").with_serial("emulator-5554");
//! let mut sampler = Sampler::new(adb);
//! let report = sampler.sample("com.example.app").unwrap();
//! println!("pss = {} KB", report.snapshot.memory.pss);
//! ```
//!
//! ## Testing (with MockExecutor)
//!
//! ```
//! use devperf::collector::{MockExecutor, collect_memory_metrics};
//!
//! let device = MockExecutor::typical_app();
//! let memory = collect_memory_metrics(&device, "com.example.app").unwrap();
//! assert_eq!(memory.pss, 45678);
//! ```

mod cpu;
mod error;
mod memory;
pub mod mock;
pub mod parser;
mod process;
mod sampler;
pub mod traits;

pub use cpu::{collect_cpu_metrics, collect_cpu_metrics_for_pid, collect_cpu_report};
pub use error::{CollectError, ExecError};
pub use memory::{collect_memory_metrics, collect_memory_report};
pub use mock::MockExecutor;
pub use process::{ProcessId, locate_process};
pub use sampler::{Metric, MetricFailure, SampleReport, SampleTiming, Sampler};
pub use traits::{AdbExecutor, CommandExecutor};
