//! Change poller
//!
//! Polls the height oracle on a fixed interval. Each time the height advances
//! past the last observed value, one fingerprint-and-anchor cycle runs to
//! completion before the next poll.

use crate::config::NotaryConfig;
use crate::error::{LedgerError, NotaryError};
use crate::ledger::{AnchorClient, ChainId, CommitmentId, HeightOracle};
use crate::snapshot::{snapshot_file_name, Fingerprinter};
use crate::types::{digest_hex, Digest};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

/// Where the poll loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Polling,
    Triggering,
}

/// In-memory poll state; not persisted across restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollState {
    pub last_observed_height: u64,
}

/// Result of one successful cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub height: u64,
    pub snapshot_path: PathBuf,
    pub root: Digest,
    pub records: usize,
    pub commitment: CommitmentId,
}

/// What a single poll did
#[derive(Debug)]
pub enum TickOutcome {
    /// The oracle could not be queried; state is unchanged
    QueryFailed,
    /// The height did not move past the last observed value
    NoAdvance { height: u64 },
    /// The height advanced and a cycle ran
    Triggered {
        height: u64,
        result: Result<CycleReport, NotaryError>,
    },
}

pub struct Scheduler {
    oracle: Arc<dyn HeightOracle>,
    anchor: Arc<dyn AnchorClient>,
    fingerprinter: Fingerprinter,
    source_dir: PathBuf,
    output_dir: PathBuf,
    poll_interval: Duration,
    submit_timeout: Duration,
    state: SchedulerState,
    poll: PollState,
}

impl Scheduler {
    /// Query the starting height and confirm the anchor chain exists.
    ///
    /// Either failure is fatal; the daemon never starts polling.
    pub async fn initialize(
        config: &NotaryConfig,
        oracle: Arc<dyn HeightOracle>,
        anchor: Arc<dyn AnchorClient>,
    ) -> Result<Self, NotaryError> {
        config.scheduler.validate().map_err(NotaryError::Config)?;
        let chain_id: ChainId = config
            .ledger
            .chain_id
            .parse()
            .map_err(NotaryError::Config)?;

        let height = oracle
            .current_height()
            .await
            .map_err(|e| NotaryError::Startup(format!("Failed to query ledger height: {}", e)))?;

        let exists = oracle.chain_exists(&chain_id).await.map_err(|e| {
            NotaryError::Startup(format!("Failed to look up chain {}: {}", chain_id, e))
        })?;
        if !exists {
            return Err(NotaryError::Startup(format!(
                "Chain {} does not exist on the ledger",
                chain_id
            )));
        }

        info!(height, chain = %chain_id, "Scheduler initialized");
        Ok(Self {
            oracle,
            anchor,
            fingerprinter: Fingerprinter::new(config.snapshot.walker_config()),
            source_dir: config.snapshot.source_dir.clone(),
            output_dir: config.snapshot.output_dir.clone(),
            poll_interval: config.scheduler.poll_interval(),
            submit_timeout: config.scheduler.submit_timeout(),
            state: SchedulerState::Idle,
            poll: PollState {
                last_observed_height: height,
            },
        })
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn poll_state(&self) -> PollState {
        self.poll
    }

    /// Poll once, running a cycle if the height advanced
    pub async fn tick(&mut self) -> TickOutcome {
        self.state = SchedulerState::Polling;

        let height = match self.oracle.current_height().await {
            Ok(height) => height,
            Err(e) => {
                warn!(error = %e, "Height query failed");
                self.state = SchedulerState::Idle;
                return TickOutcome::QueryFailed;
            }
        };

        if height <= self.poll.last_observed_height {
            debug!(height, last = self.poll.last_observed_height, "No height advance");
            self.state = SchedulerState::Idle;
            return TickOutcome::NoAdvance { height };
        }

        // Recorded before the cycle so a failed cycle is not retried at this height
        self.poll.last_observed_height = height;
        self.state = SchedulerState::Triggering;

        let start = Instant::now();
        let result = self.run_cycle(height).await;
        let duration_ms = start.elapsed().as_millis();
        match &result {
            Ok(report) => info!(
                height,
                snapshot = %report.snapshot_path.display(),
                root = %digest_hex(&report.root),
                records = report.records,
                entry_hash = %report.commitment,
                duration_ms,
                "Snapshot anchored"
            ),
            Err(e) => error!(height, error = %e, duration_ms, "Cycle failed"),
        }

        self.state = SchedulerState::Idle;
        TickOutcome::Triggered { height, result }
    }

    /// Poll until `shutdown` turns true or its sender is dropped.
    ///
    /// Shutdown is only observed between cycles.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately
        interval.tick().await;

        info!(interval_secs = self.poll_interval.as_secs(), "Polling for height changes");
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!(
            last_height = self.poll.last_observed_height,
            "Scheduler stopped"
        );
    }

    #[instrument(skip(self))]
    async fn run_cycle(&self, height: u64) -> Result<CycleReport, NotaryError> {
        let label = snapshot_file_name(height);
        let target = self.output_dir.join(&label);

        let fingerprinter = self.fingerprinter.clone();
        let source = self.source_dir.clone();
        let snapshot_path = target.clone();
        let snapshot = tokio::task::spawn_blocking(move || {
            fingerprinter.create(&source, &snapshot_path, height)
        })
        .await
        .map_err(|e| NotaryError::Task(format!("Fingerprint task failed: {}", e)))??;

        let root = *snapshot.root_digest();
        let commitment =
            tokio::time::timeout(self.submit_timeout, self.anchor.submit(&root, &label))
                .await
                .map_err(|_| LedgerError::Timeout(self.submit_timeout))??;

        Ok(CycleReport {
            height,
            snapshot_path: target,
            root,
            records: snapshot.records().len(),
            commitment,
        })
    }
}
