//! Mock command executor and device fixtures for testing.

mod executor;
mod scenarios;

pub use executor::MockExecutor;
pub use scenarios::{PACKAGE, PID};
