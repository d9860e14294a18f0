//! Abstraction over running diagnostic commands on a device.
//!
//! The `CommandExecutor` trait lets the collectors work against a real device
//! through `adb` and against canned output in tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use tracing::trace;

use crate::collector::error::ExecError;

/// Runs a shell command on a target device and captures its standard output.
///
/// Implementations block until the command finishes and are responsible for
/// any timeout policy. The collectors treat every call as side-effect free.
pub trait CommandExecutor: Send + Sync {
    /// Identifier of the device commands are sent to.
    fn device_id(&self) -> &str;

    /// Runs `args` on the device and returns the captured standard output.
    ///
    /// # Arguments
    /// * `args` - Program and arguments, e.g. `["pidof", "com.example.app"]`
    fn execute(&self, args: &[&str]) -> Result<Vec<u8>, ExecError>;
}

impl<T: CommandExecutor + ?Sized> CommandExecutor for &T {
    fn device_id(&self) -> &str {
        (**self).device_id()
    }

    fn execute(&self, args: &[&str]) -> Result<Vec<u8>, ExecError> {
        (**self).execute(args)
    }
}

impl<T: CommandExecutor + ?Sized> CommandExecutor for Arc<T> {
    fn device_id(&self) -> &str {
        (**self).device_id()
    }

    fn execute(&self, args: &[&str]) -> Result<Vec<u8>, ExecError> {
        (**self).execute(args)
    }
}

/// Executor that runs commands through `adb shell`.
///
/// Without a serial, `adb` picks the only attached device (or the one named by
/// `ANDROID_SERIAL`).
#[derive(Debug, Clone)]
pub struct AdbExecutor {
    adb: PathBuf,
    serial: Option<String>,
}

impl AdbExecutor {
    /// Device id reported when no serial was configured.
    const DEFAULT_DEVICE: &'static str = "default";

    /// Creates an executor using the given `adb` binary.
    pub fn new(adb: impl Into<PathBuf>) -> Self {
        Self {
            adb: adb.into(),
            serial: None,
        }
    }

    /// Targets the device with the given serial (`adb -s`).
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    pub fn adb_path(&self) -> &Path {
        &self.adb
    }

    /// Full argument list passed to `adb` for a device command.
    fn adb_args<'a>(&'a self, args: &[&'a str]) -> Vec<&'a str> {
        let mut full = Vec::with_capacity(args.len() + 3);
        if let Some(ref serial) = self.serial {
            full.push("-s");
            full.push(serial.as_str());
        }
        full.push("shell");
        full.extend_from_slice(args);
        full
    }
}

impl Default for AdbExecutor {
    fn default() -> Self {
        Self::new("adb")
    }
}

impl CommandExecutor for AdbExecutor {
    fn device_id(&self) -> &str {
        self.serial.as_deref().unwrap_or(Self::DEFAULT_DEVICE)
    }

    fn execute(&self, args: &[&str]) -> Result<Vec<u8>, ExecError> {
        let full = self.adb_args(args);
        trace!(adb = %self.adb.display(), args = ?full, "running device command");

        let output = Command::new(&self.adb)
            .args(&full)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExecError::Spawn {
                program: self.adb.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(ExecError::Status {
                code: output.status.code(),
                stdout: output.stdout,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}
