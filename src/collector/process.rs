//! Resolves a package name to a live process id on the device.

use std::fmt;

use tracing::debug;

use crate::collector::error::CollectError;
use crate::collector::traits::CommandExecutor;

/// Opaque handle naming a running process on the device.
///
/// Resolved fresh on every sampling pass; a process may restart between
/// samples and come back under a different id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessId(String);

impl ProcessId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Finds the process running `package` with `pidof`.
///
/// Fails with `ProcessNotFound` when nothing matches (empty output, or a
/// silent non-zero exit) and with `CommandExecution` when the device could
/// not run the lookup at all. When several processes match, the first id
/// is used.
pub fn locate_process<E: CommandExecutor + ?Sized>(
    device: &E,
    package: &str,
) -> Result<ProcessId, CollectError> {
    let args = ["pidof", package];

    let output = match device.execute(&args) {
        Ok(output) => output,
        Err(e) if e.is_silent_failure() => {
            return Err(CollectError::ProcessNotFound {
                package: package.to_string(),
            });
        }
        Err(e) => return Err(CollectError::command(&args, e)),
    };

    let output = String::from_utf8_lossy(&output);
    let mut pids = output.split_whitespace();

    let Some(pid) = pids.next() else {
        return Err(CollectError::ProcessNotFound {
            package: package.to_string(),
        });
    };

    let others: Vec<&str> = pids.collect();
    if !others.is_empty() {
        debug!(package, pid, ignored = ?others, "multiple processes match, using the first");
    }

    Ok(ProcessId(pid.to_string()))
}
