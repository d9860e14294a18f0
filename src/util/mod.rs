//! Utility modules for devperf.

pub mod daemon;

pub use daemon::{DAEMON_ENV_VAR, DaemonError, daemonize, is_daemon_child};
