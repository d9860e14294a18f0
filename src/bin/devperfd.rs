//! devperfd - samples CPU and memory usage of an app on an attached device.
//!
//! Each pass resolves the app's process, collects its metrics over `adb shell`
//! and emits one JSON snapshot per line to stdout or an output file.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use devperf::collector::{AdbExecutor, CollectError, Sampler};
use devperf::output::{SnapshotWriter, open_append};
use devperf::util::{daemonize, is_daemon_child};

/// Per-app performance sampler.
#[derive(Parser, Debug)]
#[command(
    name = "devperfd",
    about = "Samples CPU and memory usage of an app on an attached device",
    version
)]
struct Args {
    /// Package name of the app to sample.
    package: String,

    /// Serial of the target device (as listed by `adb devices`).
    #[arg(short, long, env = "ANDROID_SERIAL")]
    serial: Option<String>,

    /// Path to the adb binary.
    #[arg(long, env = "DEVPERF_ADB", default_value = "adb")]
    adb: PathBuf,

    /// Sampling interval in seconds.
    #[arg(short, long, default_value = "1")]
    interval: u64,

    /// Number of samples to take. 0 samples until interrupted.
    #[arg(short = 'n', long, default_value = "0")]
    count: u64,

    /// Append snapshots to this file instead of writing them to stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Pretty-print JSON snapshots.
    #[arg(long)]
    pretty: bool,

    /// Detach from the terminal and keep sampling in the background.
    #[arg(long, requires = "output")]
    detach: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber on stderr; stdout carries snapshots.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("devperfd={}", level).parse().unwrap())
        .add_directive(format!("devperf={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let mut args = Args::parse();

    init_logging(args.verbose, args.quiet);

    if args.detach {
        // The daemon runs from `/`, so the output path must not be relative.
        if let Some(output) = args.output.take() {
            match std::path::absolute(&output) {
                Ok(path) => args.output = Some(path),
                Err(e) => {
                    error!("Invalid output path {}: {}", output.display(), e);
                    return ExitCode::FAILURE;
                }
            }
        }

        match daemonize() {
            Ok(Some(child)) => {
                info!("devperfd detached (pid {})", child.id());
                return ExitCode::SUCCESS;
            }
            Ok(None) => {}
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    info!("devperfd {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: package={}, device={}, interval={}s, count={}, daemon={}",
        args.package,
        args.serial.as_deref().unwrap_or("default"),
        args.interval,
        args.count,
        is_daemon_child()
    );

    let sink: Box<dyn Write> = match args.output {
        Some(ref path) => match open_append(path) {
            Ok(file) => {
                info!("Writing snapshots to {}", path.display());
                Box::new(file)
            }
            Err(e) => {
                error!("Failed to open {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(io::stdout()),
    };
    let mut writer = SnapshotWriter::new(sink).pretty(args.pretty);

    let mut adb = AdbExecutor::new(&args.adb);
    if let Some(ref serial) = args.serial {
        adb = adb.with_serial(serial);
    }
    let mut sampler = Sampler::new(adb);

    let interval = Duration::from_secs(args.interval);

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let mut sample_count: u64 = 0;

    while running.load(Ordering::SeqCst) {
        match sampler.sample(&args.package) {
            Ok(report) => {
                if let Err(e) = writer.write(&report.snapshot) {
                    error!("Failed to write snapshot: {}", e);
                    return ExitCode::FAILURE;
                }
                debug!(
                    "Snapshot #{}: cpu {:.1}%, pss {} KB, {} failed metric(s)",
                    sample_count + 1,
                    report.snapshot.cpu.usage,
                    report.snapshot.memory.pss,
                    report.failures.len()
                );
            }
            Err(e @ CollectError::ProcessNotFound { .. }) => {
                warn!("{}, skipping sample", e);
            }
            Err(e) => {
                error!("Failed to collect sample: {}", e);
            }
        }

        if let Some(timing) = sampler.last_timing() {
            debug!(
                "Timing: total={:?} locate={:?} cpu={:?} memory={:?}",
                timing.total, timing.locate, timing.cpu, timing.memory
            );
        }

        sample_count += 1;
        if args.count > 0 && sample_count >= args.count {
            break;
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    info!("Shutdown complete after {} sample(s)", sample_count);
    ExitCode::SUCCESS
}
