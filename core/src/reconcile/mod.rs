//! Piece reconciliation
//!
//! Classifier workers deliver the events read from each screenshot as a
//! fragment keyed by `(piece_index, is_last)`. Fragments arrive in any order.
//! The [`Reconciler`] keeps one [`PendingAssembly`] per match and, the moment
//! a match becomes complete, assembles it into a [`MatchTimeline`]:
//!
//! ```text
//! deliveries ──▶ PendingAssembly ──complete?──▶ sort by index
//!                                               ──▶ drop boundary overlap
//!                                               ──▶ derive elapsed time
//!                                               ──▶ MatchTimeline (once)
//! ```
//!
//! A match is complete iff some piece `N` is marked last and every index
//! `1..=N` is present. A lost piece therefore blocks its match for good.
//!
//! The reconciler is plain data; callers hold it behind a lock and pass
//! `&mut Reconciler` into [`Reconciler::deliver`], which is the whole critical
//! section.

mod elapsed;
mod overlap;

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::timeline::{MatchId, MatchTimeline, RawEvent};

pub use elapsed::{StartClockPolicy, derive_elapsed, start_clock_reference};
pub use overlap::{DEFAULT_OVERLAP_WINDOW, concat_pieces, overlap_len};

/// Position of one screenshot within its match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FragmentKey {
    /// 1-based capture order
    pub piece_index: u32,
    /// Set on the final screenshot of the match
    pub is_last: bool,
}

impl FragmentKey {
    pub fn new(piece_index: u32, is_last: bool) -> Self {
        Self {
            piece_index,
            is_last,
        }
    }
}

/// One classified piece as stored in a fragment dump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentRecord {
    pub piece_index: u32,
    #[serde(default)]
    pub is_last: bool,
    /// `None` for a piece whose classification failed
    #[serde(default)]
    pub events: Option<Vec<RawEvent>>,
}

impl FragmentRecord {
    pub fn key(&self) -> FragmentKey {
        FragmentKey::new(self.piece_index, self.is_last)
    }
}

/// Assembly settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Longest boundary run considered for overlap removal
    pub overlap_window: usize,
    pub start_clock: StartClockPolicy,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            overlap_window: DEFAULT_OVERLAP_WINDOW,
            start_clock: StartClockPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
struct Piece {
    is_last: bool,
    events: Vec<RawEvent>,
}

/// Fragments received so far for one match
#[derive(Debug, Clone, Default)]
pub struct PendingAssembly {
    pieces: BTreeMap<u32, Piece>,
    lost: BTreeSet<u32>,
}

impl PendingAssembly {
    /// Store a fragment; a repeat delivery for the same index replaces the old one
    pub fn insert(&mut self, key: FragmentKey, events: Vec<RawEvent>) {
        self.lost.remove(&key.piece_index);
        self.pieces.insert(
            key.piece_index,
            Piece {
                is_last: key.is_last,
                events,
            },
        );
    }

    /// Note a piece whose classification failed
    ///
    /// Recorded for reporting only; it never counts toward completeness.
    pub fn mark_lost(&mut self, piece_index: u32) {
        if !self.pieces.contains_key(&piece_index) {
            self.lost.insert(piece_index);
        }
    }

    /// Terminal index `N` if the match is complete through `1..=N`
    ///
    /// Index 0 is never a valid terminal piece.
    pub fn complete_through(&self) -> Option<u32> {
        self.pieces
            .iter()
            .filter(|(index, piece)| piece.is_last && **index >= 1)
            .map(|(index, _)| *index)
            .find(|&last| self.pieces.range(1..=last).count() == last as usize)
    }

    pub fn is_complete(&self) -> bool {
        self.complete_through().is_some()
    }

    /// Indexes received so far, ascending
    pub fn received(&self) -> Vec<u32> {
        self.pieces.keys().copied().collect()
    }

    /// Indexes whose classification failed, ascending
    pub fn lost(&self) -> Vec<u32> {
        self.lost.iter().copied().collect()
    }

    /// Event lists for pieces `1..=last`, in index order
    fn into_ordered_events(self, last: u32) -> Vec<Vec<RawEvent>> {
        self.pieces
            .into_iter()
            .filter(|(index, _)| *index <= last)
            .map(|(_, piece)| piece.events)
            .collect()
    }
}

/// Outcome of a single delivery
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Stored; the match still has missing pieces
    Pending,
    /// The match just completed. `None` if its pieces held no events at all.
    Completed(Option<MatchTimeline>),
    /// Not stored: bad index, or the match already completed
    Ignored,
}

/// A match that never completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbandonedMatch {
    pub match_id: MatchId,
    pub received: Vec<u32>,
    pub lost: Vec<u32>,
}

/// Registry of in-flight matches
///
/// Owns every [`PendingAssembly`]; entries are created on the first fragment
/// for a match and removed when it completes.
#[derive(Debug, Default)]
pub struct Reconciler {
    config: AssemblyConfig,
    pending: HashMap<MatchId, PendingAssembly>,
    finished: HashSet<MatchId>,
    start_clocks: HashMap<MatchId, f32>,
}

impl Reconciler {
    pub fn new(config: AssemblyConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// Record the header start clock for a match
    ///
    /// Only consulted under [`StartClockPolicy::PreferHeader`].
    pub fn register_start_clock(&mut self, match_id: &MatchId, secs: f32) {
        self.start_clocks.insert(match_id.clone(), secs);
    }

    /// Insert a fragment and assemble the match if it is now complete
    pub fn deliver(
        &mut self,
        match_id: &MatchId,
        key: FragmentKey,
        events: Vec<RawEvent>,
    ) -> Delivery {
        if key.piece_index == 0 {
            warn!(%match_id, "dropping fragment with piece index 0");
            return Delivery::Ignored;
        }
        if self.finished.contains(match_id) {
            debug!(%match_id, piece = key.piece_index, "fragment for completed match ignored");
            return Delivery::Ignored;
        }

        let pending = self.pending.entry(match_id.clone()).or_default();
        pending.insert(key, events);

        let Some(last) = pending.complete_through() else {
            return Delivery::Pending;
        };

        let Some(pending) = self.pending.remove(match_id) else {
            return Delivery::Pending;
        };
        self.finished.insert(match_id.clone());

        let extra = pending.pieces.keys().filter(|&&index| index > last).count();
        if extra > 0 {
            warn!(%match_id, last, extra, "ignoring pieces past the last marker");
        }

        let header_clock = self.start_clocks.remove(match_id);
        let timeline = assemble(pending.into_ordered_events(last), header_clock, &self.config);
        debug!(
            %match_id,
            pieces = last,
            events = timeline.as_ref().map_or(0, MatchTimeline::len),
            "match assembled"
        );
        Delivery::Completed(timeline)
    }

    /// Note a piece that failed classification
    pub fn record_lost(&mut self, match_id: &MatchId, piece_index: u32) {
        if self.finished.contains(match_id) {
            return;
        }
        warn!(%match_id, piece = piece_index, "piece lost; match cannot complete");
        self.pending
            .entry(match_id.clone())
            .or_default()
            .mark_lost(piece_index);
    }

    pub fn is_pending(&self, match_id: &MatchId) -> bool {
        self.pending.contains_key(match_id)
    }

    pub fn is_finished(&self, match_id: &MatchId) -> bool {
        self.finished.contains(match_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drain every still-pending match, sorted by id
    ///
    /// Ends the batch: finished ids and registered clocks are forgotten too,
    /// so the same reconciler can serve the next batch.
    pub fn abandon_all(&mut self) -> Vec<AbandonedMatch> {
        let mut abandoned: Vec<AbandonedMatch> = self
            .pending
            .drain()
            .map(|(match_id, pending)| AbandonedMatch {
                match_id,
                received: pending.received(),
                lost: pending.lost(),
            })
            .collect();
        abandoned.sort_by(|a, b| a.match_id.cmp(&b.match_id));
        self.start_clocks.clear();
        self.finished.clear();
        abandoned
    }
}

/// Build a timeline from ordered piece event lists
pub fn assemble(
    pieces: Vec<Vec<RawEvent>>,
    header_clock: Option<f32>,
    config: &AssemblyConfig,
) -> Option<MatchTimeline> {
    let events = concat_pieces(pieces, config.overlap_window);
    MatchTimeline::new(derive_elapsed(events, header_clock, config.start_clock))
}
