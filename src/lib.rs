//! devperf - per-process performance metrics for attached devices.
//!
//! This library provides the sampling engine used by `devperfd`:
//! - `collector` - process lookup, CPU and memory pipelines, parsers
//! - `models` - metric records and the composite snapshot
//! - `output` - JSON lines snapshot writer
//! - `util` - process detachment

pub mod collector;
pub mod models;
pub mod output;
pub mod util;
