//! rmirror - one-way directory mirroring daemon
//!
//! Periodically reconciles a replica directory tree against an
//! authoritative source tree: new and changed files are copied in,
//! extraneous replica entries are removed. Change detection is by
//! content digest, never by size or timestamps alone. The source is
//! never written to.

use anyhow::Result;
use clap::Parser;
use rmirror_engine::MirrorScheduler;
use rmirror_sync::validate_paths;
use rmirror_types::Error;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

/// rmirror - one-way directory mirroring daemon
#[derive(Parser)]
#[command(
    name = "rmirror",
    version = env!("CARGO_PKG_VERSION"),
    about = "One-way directory mirroring daemon",
    long_about = "rmirror keeps a replica directory tree identical to a source tree.\n\
                  Every cycle copies new and changed files into the replica (change\n\
                  detection by content digest) and removes replica entries that no\n\
                  longer exist in the source. Cycles repeat until the process is\n\
                  stopped with Ctrl-C."
)]
struct Cli {
    /// Path to the source directory (never modified)
    source_path: PathBuf,

    /// Path to the replica directory (created if missing)
    replica_path: PathBuf,

    /// Synchronization interval in whole seconds
    sync_interval: u64,

    /// Path to the log file (appended to)
    log_file_path: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Quiet mode - errors only on the console
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = match init_logging(&cli.log_file_path, cli.debug, cli.quiet) {
        Ok(guard) => guard,
        Err(e) => {
            // No log sink exists yet, stderr is all we have
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    info!("rmirror v{} starting", env!("CARGO_PKG_VERSION"));

    let paths = match validate_paths(&cli.source_path, &cli.replica_path).await {
        Ok(paths) => paths,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    let interval = Duration::from_secs(cli.sync_interval);
    let (scheduler, handle) = MirrorScheduler::new(paths, interval);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, stopping after the current cycle");
            handle.stop().await;
        }
    });

    scheduler.run().await?;
    Ok(())
}

/// Set up console and file logging
///
/// The returned guard owns the background log writer; dropping it
/// flushes and closes the file sink, so it must live for the whole
/// process.
fn init_logging(
    log_file_path: &std::path::Path,
    debug: bool,
    quiet: bool,
) -> std::result::Result<WorkerGuard, Error> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = if debug {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| Error::logging(format!("Invalid log filter: {}", e)))?;

    if let Some(parent) = log_file_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::logging(format!(
                    "Failed to create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| {
            Error::logging(format!(
                "Failed to open log file '{}': {}",
                log_file_path.display(),
                e
            ))
        })?;
    let (file_writer, guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()
        .map_err(|e| Error::logging(format!("Failed to install log subscriber: {}", e)))?;

    Ok(guard)
}
