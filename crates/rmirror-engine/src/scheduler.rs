//! The periodic synchronize-then-prune loop

use rmirror_sync::{CycleReport, MirrorOptions, TreePruner, TreeSynchronizer, ValidatedPaths};
use rmirror_types::Result;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Handle for requesting a scheduler stop
///
/// Stopping is honored at the next pause; a cycle that is already in
/// flight always completes first.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl SchedulerHandle {
    /// Request the scheduler to stop after the current cycle
    pub async fn stop(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Runs full mirror cycles at a fixed interval until stopped
///
/// Each cycle is independent and stateless: the synchronize phase
/// fully completes before the prune phase begins, and a new cycle
/// never starts while the previous one is running, even when a cycle
/// overruns the configured interval.
#[derive(Debug)]
pub struct MirrorScheduler {
    paths: ValidatedPaths,
    interval: Duration,
    synchronizer: TreeSynchronizer,
    pruner: TreePruner,
    shutdown_rx: mpsc::Receiver<()>,
}

impl MirrorScheduler {
    /// Create a scheduler with default mirror options
    pub fn new(paths: ValidatedPaths, interval: Duration) -> (Self, SchedulerHandle) {
        Self::with_options(paths, interval, MirrorOptions::default())
    }

    /// Create a scheduler with custom mirror options
    pub fn with_options(
        paths: ValidatedPaths,
        interval: Duration,
        options: MirrorOptions,
    ) -> (Self, SchedulerHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let scheduler = Self {
            paths,
            interval,
            synchronizer: TreeSynchronizer::with_options(options),
            pruner: TreePruner::new(),
            shutdown_rx,
        };
        (scheduler, SchedulerHandle { shutdown_tx })
    }

    /// Run one full cycle: synchronize, then prune
    ///
    /// The merged report covers both phases. Per-entry failures are
    /// carried in the report; an `Err` means a whole phase could not
    /// run (for example the source root became unreadable).
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let mut report = self
            .synchronizer
            .synchronize(self.paths.source(), self.paths.replica())
            .await?;
        report.merge(
            self.pruner
                .prune(self.paths.source(), self.paths.replica())
                .await?,
        );

        if report.has_failures() {
            warn!(
                "Cycle finished with {} per-entry failures; they will be retried next cycle",
                report.failures.len()
            );
        }
        Ok(report)
    }

    /// Run cycles at the configured interval until a stop is requested
    ///
    /// Cycle-level errors are logged and the loop keeps going; the
    /// next cycle retries from current filesystem state. The loop
    /// itself only ends through the [`SchedulerHandle`].
    pub async fn run(mut self) -> Result<()> {
        info!(
            "Mirroring '{}' -> '{}' every {:?}",
            self.paths.source().display(),
            self.paths.replica().display(),
            self.interval
        );

        loop {
            match self.run_cycle().await {
                Ok(report) => {
                    if !report.stats.is_noop() {
                        info!(
                            "Cycle complete: {} dirs created, {} files copied, {} files removed, {} dirs removed",
                            report.stats.directories_created,
                            report.stats.files_copied,
                            report.stats.files_removed,
                            report.stats.directories_removed
                        );
                    }
                }
                Err(e) => error!("Cycle failed: {}", e),
            }

            tokio::select! {
                // Stop requests take precedence over an elapsed pause
                biased;
                _ = self.shutdown_rx.recv() => {
                    info!("Stop requested, ending mirror loop");
                    break;
                }
                () = tokio::time::sleep(self.interval) => {}
            }
        }

        Ok(())
    }
}
