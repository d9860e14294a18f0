//! Background detachment for the sampling binary.
//!
//! The running binary is started again with the same arguments and a marker
//! environment variable. The parent gets the child handle and is expected to
//! exit. The child sees the marker and carries on as the daemon.

use std::env;
use std::ffi::OsStr;
use std::io;
use std::process::{Child, Command, Stdio};

/// Environment variable marking the detached child.
pub const DAEMON_ENV_VAR: &str = "DEVPERF_DAEMON";

/// File mode creation mask of the detached child.
#[cfg(unix)]
const DAEMON_UMASK: libc::mode_t = 0o027;

/// Error detaching the current process.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("failed to locate current executable: {0}")]
    CurrentExe(#[source] io::Error),

    #[error("failed to daemonize: {0}")]
    Spawn(#[source] io::Error),
}

/// Returns `true` inside the detached child.
pub fn is_daemon_child() -> bool {
    is_marker_set(env::var_os(DAEMON_ENV_VAR).as_deref())
}

fn is_marker_set(value: Option<&OsStr>) -> bool {
    value.is_some_and(|v| v == "1")
}

/// Detaches the current process.
///
/// Returns `Some(child)` in the parent and `None` in the detached child.
/// On Unix the child leads a new session, runs with umask 027 from `/` and
/// has stdio attached to the null device, so relative paths must be
/// resolved before calling this.
pub fn daemonize() -> Result<Option<Child>, DaemonError> {
    if is_daemon_child() {
        return Ok(None);
    }

    let exe = env::current_exe().map_err(DaemonError::CurrentExe)?;

    let mut cmd = Command::new(exe);
    cmd.args(env::args_os().skip(1))
        .env(DAEMON_ENV_VAR, "1")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    detach(&mut cmd);

    let child = cmd.spawn().map_err(DaemonError::Spawn)?;
    Ok(Some(child))
}

#[cfg(unix)]
fn detach(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;

    cmd.current_dir("/");

    // SAFETY: setsid and umask are async-signal-safe and touch no memory
    // shared with the parent.
    unsafe {
        cmd.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(io::Error::last_os_error());
            }
            libc::umask(DAEMON_UMASK);
            Ok(())
        });
    }
}

#[cfg(windows)]
fn detach(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;

    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

    cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(any(unix, windows)))]
fn detach(_cmd: &mut Command) {}
