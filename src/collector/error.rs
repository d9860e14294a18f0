//! Error types for command execution and metric collection.

use std::io;

/// Failure of the device to run a command at all.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The transport binary could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The command ran but exited unsuccessfully.
    #[error("exited with status {}: {}", exit_code(.code), stderr_text(.stderr))]
    Status {
        code: Option<i32>,
        stdout: Vec<u8>,
        stderr: String,
    },
}

fn exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

fn stderr_text(stderr: &str) -> &str {
    if stderr.is_empty() {
        "<no output>"
    } else {
        stderr
    }
}

impl ExecError {
    /// True for an unsuccessful exit that printed nothing on either stream.
    ///
    /// Lookup tools such as `pidof` report "no match" this way.
    pub fn is_silent_failure(&self) -> bool {
        match self {
            ExecError::Status { stdout, stderr, .. } => {
                stdout.iter().all(u8::is_ascii_whitespace) && stderr.trim().is_empty()
            }
            ExecError::Spawn { .. } => false,
        }
    }
}

/// Error returned by the collection pipelines.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// The package has no running process.
    #[error("process not running for package: {package}")]
    ProcessNotFound { package: String },

    /// The device could not run a diagnostic command.
    #[error("failed to run `{command}`: {source}")]
    CommandExecution {
        command: String,
        #[source]
        source: ExecError,
    },

    /// `/proc/[pid]/stat` did not have the expected layout.
    #[error("malformed /proc stat: {reason}")]
    MalformedStatFormat { reason: String },

    /// `dumpsys meminfo` never reported `TOTAL PSS`.
    #[error("failed to extract TOTAL PSS from meminfo output")]
    MissingPss,
}

impl CollectError {
    pub(crate) fn command(args: &[&str], source: ExecError) -> Self {
        CollectError::CommandExecution {
            command: args.join(" "),
            source,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        CollectError::MalformedStatFormat {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_failure() {
        let err = ExecError::Status {
            code: Some(1),
            stdout: b"\n".to_vec(),
            stderr: String::new(),
        };
        assert!(err.is_silent_failure());

        let err = ExecError::Status {
            code: Some(1),
            stdout: Vec::new(),
            stderr: "error: device offline".to_string(),
        };
        assert!(!err.is_silent_failure());

        let err = ExecError::Spawn {
            program: "adb".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(!err.is_silent_failure());
    }

    #[test]
    fn test_command_error_display() {
        let err = CollectError::command(
            &["cat", "/proc/1/stat"],
            ExecError::Status {
                code: Some(1),
                stdout: Vec::new(),
                stderr: "Permission denied".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "failed to run `cat /proc/1/stat`: exited with status 1: Permission denied"
        );
    }
}
