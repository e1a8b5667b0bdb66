//! Batch loading: one job per replay file

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hashbrown::HashSet;
use serde::Serialize;
use spyglass_header::{MatchHeader, decode};
use tracing::warn;

use crate::timeline::MatchId;

/// A decoded replay waiting to be captured
#[derive(Debug, Clone)]
pub struct MatchJob {
    pub header: MatchHeader,
    pub source: PathBuf,
}

impl MatchJob {
    pub fn new(header: MatchHeader, source: impl Into<PathBuf>) -> Self {
        Self {
            header,
            source: source.into(),
        }
    }

    pub fn match_id(&self) -> MatchId {
        MatchId(self.header.uuid.clone())
    }
}

/// A replay file that could not be turned into a job
#[derive(Debug, Clone, Serialize)]
pub struct DecodeFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Jobs for a batch plus the files that failed to load
#[derive(Debug, Default)]
pub struct JobBatch {
    pub jobs: Vec<MatchJob>,
    pub decode_failures: Vec<DecodeFailure>,
}

/// Read and decode one replay header
pub fn read_header(path: &Path) -> Result<MatchHeader> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    decode(&bytes).with_context(|| format!("failed to decode {}", path.display()))
}

/// Decode every file into a job
///
/// A bad file is recorded and skipped; it never stops the batch. A second
/// file with an id already seen is skipped too.
pub fn load_jobs<I, P>(paths: I) -> JobBatch
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut batch = JobBatch::default();
    let mut seen = HashSet::new();

    for path in paths {
        let path = path.as_ref();
        match read_header(path) {
            Ok(header) => {
                let job = MatchJob::new(header, path);
                if seen.insert(job.match_id()) {
                    batch.jobs.push(job);
                } else {
                    warn!(match_id = %job.match_id(), path = %path.display(), "duplicate replay skipped");
                }
            }
            Err(err) => {
                warn!("{err:#}");
                batch.decode_failures.push(DecodeFailure {
                    path: path.to_path_buf(),
                    error: format!("{err:#}"),
                });
            }
        }
    }

    batch
}
