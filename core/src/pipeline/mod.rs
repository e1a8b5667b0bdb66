//! Batch orchestration
//!
//! Drives capture, classification, assembly, validation and commit for a
//! batch of replays:
//!
//! ```text
//!  calling thread                      classifier workers (N)
//!  ──────────────                      ──────────────────────
//!  for each job:                       for each queued piece:
//!    wait for window                     classify (no lock)
//!    begin_match                         lock ─▶ Reconciler::deliver
//!    capture_next ──▶ bounded queue ──▶          record completion
//!  close queue, join workers ◀──────── exit when queue drained
//!  validate every job ─▶ commit or discard
//! ```
//!
//! Capture is sequential because it drives one game window. Validation and
//! commit happen after the barrier, so the sink is only touched from the
//! calling thread.

mod capture;
mod jobs;
mod sink;
mod workers;

use std::fmt;
use std::io;
use std::mem;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::classify::EventClassifier;
use crate::coherency::{Coherency, validate};
use crate::config::Config;
use crate::reconcile::Reconciler;
use crate::timeline::MatchId;

pub use capture::{CaptureError, CaptureSource, CapturedPiece, wait_for_window};
pub use jobs::{DecodeFailure, JobBatch, MatchJob, load_jobs, read_header};
pub use sink::{MemorySink, SinkError, TimelineSink};

use workers::{Shared, WorkItem, WorkerPool, lock};

/// Batch-fatal failures
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("failed to start classifier workers: {0}")]
    Spawn(#[from] io::Error),
    #[error("classifier workers exited before the queue closed")]
    WorkersGone,
    #[error("a classifier worker panicked")]
    WorkerPanicked,
}

/// A match that was not committed
#[derive(Debug, Clone, Serialize)]
pub struct RejectedMatch {
    pub match_id: MatchId,
    pub source: PathBuf,
    pub violations: Coherency,
    /// Pieces received, if the match never completed
    pub received_pieces: Vec<u32>,
    /// Pieces whose classification failed
    pub lost_pieces: Vec<u32>,
}

/// A coherent match the sink refused
#[derive(Debug, Clone, Serialize)]
pub struct CommitFailure {
    pub match_id: MatchId,
    pub error: String,
}

/// What happened to every file in a batch
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub committed: Vec<MatchId>,
    pub rejected: Vec<RejectedMatch>,
    pub decode_failures: Vec<DecodeFailure>,
    pub commit_failures: Vec<CommitFailure>,
    /// Screenshots captured across the batch
    pub pieces_captured: usize,
    /// Screenshots the classifier could not read
    pub pieces_lost: usize,
}

impl BatchReport {
    /// One-line summary for logs
    pub fn summary(&self) -> String {
        self.to_string()
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
            && self.decode_failures.is_empty()
            && self.commit_failures.is_empty()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} committed, {} rejected, {} unreadable, {} commit failures ({} pieces, {} lost)",
            self.committed.len(),
            self.rejected.len(),
            self.decode_failures.len(),
            self.commit_failures.len(),
            self.pieces_captured,
            self.pieces_lost,
        )
    }
}

/// Runs batches with one classifier and one configuration
pub struct Pipeline {
    config: Config,
    classifier: Arc<dyn EventClassifier>,
}

impl Pipeline {
    pub fn new(config: Config, classifier: Arc<dyn EventClassifier>) -> Self {
        Self { config, classifier }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process a batch end to end
    ///
    /// Returns `Err` only for failures that stop the whole batch: the game
    /// window timing out, automation errors, or the worker pool dying.
    pub fn run(
        &self,
        batch: JobBatch,
        capture: &mut dyn CaptureSource,
        sink: &mut dyn TimelineSink,
    ) -> Result<BatchReport, PipelineError> {
        let JobBatch {
            jobs,
            decode_failures,
        } = batch;

        let mut reconciler = Reconciler::new(self.config.assembly);
        for job in &jobs {
            if let Some(clock) = job.header.start_clock_secs {
                reconciler.register_start_clock(&job.match_id(), clock as f32);
            }
        }
        let shared = Arc::new(Mutex::new(Shared::new(reconciler)));

        let pool = WorkerPool::spawn(
            self.config.classify.workers,
            self.config.classify.queue_capacity,
            Arc::clone(&self.classifier),
            Arc::clone(&shared),
        )?;

        info!(
            matches = jobs.len(),
            workers = self.config.classify.workers.max(1),
            "starting batch"
        );

        let mut pieces_captured = 0;
        for job in &jobs {
            pieces_captured += self.capture_match(job, capture, &pool)?;
        }
        pool.finish()?;

        let (mut completed, abandoned, pieces_lost) = {
            let mut state = lock(&shared);
            (
                mem::take(&mut state.completed),
                state.reconciler.abandon_all(),
                state.lost_pieces,
            )
        };

        let mut report = BatchReport {
            decode_failures,
            pieces_captured,
            pieces_lost,
            ..BatchReport::default()
        };

        for job in jobs {
            let match_id = job.match_id();
            let timeline = completed.remove(&match_id).flatten();
            let violations = validate(timeline.as_ref(), &job.header);

            match timeline {
                Some(timeline) if violations.is_coherent() => {
                    match sink.commit(&job.header, timeline) {
                        Ok(()) => {
                            debug!(%match_id, "match committed");
                            report.committed.push(match_id);
                        }
                        Err(err) => {
                            warn!(%match_id, "{err}");
                            report.commit_failures.push(CommitFailure {
                                match_id,
                                error: err.to_string(),
                            });
                        }
                    }
                }
                _ => {
                    warn!(%match_id, %violations, "match rejected");
                    if let Err(err) = sink.discard(&match_id) {
                        warn!(%match_id, "{err}");
                    }
                    let pending = abandoned.iter().find(|a| a.match_id == match_id);
                    report.rejected.push(RejectedMatch {
                        received_pieces: pending.map(|a| a.received.clone()).unwrap_or_default(),
                        lost_pieces: pending.map(|a| a.lost.clone()).unwrap_or_default(),
                        match_id,
                        source: job.source,
                        violations,
                    });
                }
            }
        }

        info!("batch finished: {report}");
        Ok(report)
    }

    /// Capture every piece of one match onto the queue
    fn capture_match(
        &self,
        job: &MatchJob,
        capture: &mut dyn CaptureSource,
        pool: &WorkerPool,
    ) -> Result<usize, PipelineError> {
        let match_id = job.match_id();
        wait_for_window(
            capture,
            self.config.capture.ready_timeout(),
            self.config.capture.poll_interval(),
        )?;
        capture.begin_match(job)?;
        info!(%match_id, source = %job.source.display(), "capturing match");

        let mut pieces = 0;
        while let Some(piece) = capture.capture_next()? {
            pool.submit(WorkItem {
                match_id: match_id.clone(),
                key: piece.key,
                image: piece.image,
            })?;
            pieces += 1;
        }
        debug!(%match_id, pieces, "capture finished");
        Ok(pieces)
    }
}

