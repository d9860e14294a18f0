//! In-memory command executor for testing collectors without a device.
//!
//! `MockExecutor` maps full command lines to canned output or failures and
//! records every command it was asked to run.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use crate::collector::error::ExecError;
use crate::collector::traits::CommandExecutor;

#[derive(Debug, Clone)]
enum MockResponse {
    Output(String),
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
    },
    SpawnFailure,
}

/// Executor that answers commands from a table.
///
/// Commands are keyed by their arguments joined with single spaces, e.g.
/// `"cat /proc/12345/stat"`. Unknown commands fail like a missing binary
/// in the device shell (exit status 127).
#[derive(Debug)]
pub struct MockExecutor {
    device_id: String,
    responses: HashMap<String, MockResponse>,
    calls: Mutex<Vec<String>>,
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new("mock-device")
    }
}

impl MockExecutor {
    /// Creates an executor with no registered commands.
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Registers successful output for a command line.
    pub fn add_output(&mut self, command: &str, stdout: impl Into<String>) {
        self.responses
            .insert(command.to_string(), MockResponse::Output(stdout.into()));
    }

    /// Registers an unsuccessful exit for a command line.
    pub fn add_exit(
        &mut self,
        command: &str,
        code: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) {
        self.responses.insert(
            command.to_string(),
            MockResponse::Exit {
                code,
                stdout: stdout.into(),
                stderr: stderr.into(),
            },
        );
    }

    /// Makes a command fail as if the transport binary could not start.
    pub fn add_spawn_failure(&mut self, command: &str) {
        self.responses
            .insert(command.to_string(), MockResponse::SpawnFailure);
    }

    /// Forgets a registered command.
    pub fn remove(&mut self, command: &str) {
        self.responses.remove(command);
    }

    /// Every command line executed so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of times `command` was executed.
    pub fn call_count(&self, command: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == command).count()
    }
}

impl CommandExecutor for MockExecutor {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn execute(&self, args: &[&str]) -> Result<Vec<u8>, ExecError> {
        let command = args.join(" ");
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(command.clone());

        match self.responses.get(&command) {
            Some(MockResponse::Output(stdout)) => Ok(stdout.clone().into_bytes()),
            Some(MockResponse::Exit {
                code,
                stdout,
                stderr,
            }) => Err(ExecError::Status {
                code: Some(*code),
                stdout: stdout.clone().into_bytes(),
                stderr: stderr.clone(),
            }),
            Some(MockResponse::SpawnFailure) => Err(ExecError::Spawn {
                program: "adb".to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
            }),
            None => Err(ExecError::Status {
                code: Some(127),
                stdout: Vec::new(),
                stderr: format!(
                    "/system/bin/sh: {}: inaccessible or not found",
                    args.first().copied().unwrap_or_default()
                ),
            }),
        }
    }
}
