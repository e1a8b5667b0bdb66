//! Persistence seam
//!
//! Storage is external. The pipeline hands each coherent match to a
//! [`TimelineSink`] exactly once and asks it to drop anything it holds for a
//! rejected match.

use std::collections::BTreeMap;

use spyglass_header::MatchHeader;
use thiserror::Error;

use crate::timeline::{MatchId, MatchTimeline};

/// Storage failure; reported, never retried
#[derive(Debug, Clone, Error)]
#[error("sink error: {0}")]
pub struct SinkError(pub String);

/// Receives validated matches
pub trait TimelineSink {
    /// Store a coherent match
    fn commit(&mut self, header: &MatchHeader, timeline: MatchTimeline) -> Result<(), SinkError>;

    /// Remove any previously stored state for a rejected match
    fn discard(&mut self, match_id: &MatchId) -> Result<(), SinkError>;
}

/// In-memory sink, keyed by match id
#[derive(Debug, Default)]
pub struct MemorySink {
    matches: BTreeMap<MatchId, (MatchHeader, MatchTimeline)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, match_id: &MatchId) -> Option<&(MatchHeader, MatchTimeline)> {
        self.matches.get(match_id)
    }

    pub fn contains(&self, match_id: &MatchId) -> bool {
        self.matches.contains_key(match_id)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MatchId, &(MatchHeader, MatchTimeline))> {
        self.matches.iter()
    }
}

impl TimelineSink for MemorySink {
    fn commit(&mut self, header: &MatchHeader, timeline: MatchTimeline) -> Result<(), SinkError> {
        let match_id = MatchId(header.uuid.clone());
        self.matches.insert(match_id, (header.clone(), timeline));
        Ok(())
    }

    fn discard(&mut self, match_id: &MatchId) -> Result<(), SinkError> {
        self.matches.remove(match_id);
        Ok(())
    }
}
