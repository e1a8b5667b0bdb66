//! Cross-source coherency checks
//!
//! An assembled timeline is accepted only if it agrees with what the replay
//! header declares. [`validate`] never fails: it returns the set of every
//! rule the timeline breaks, and the empty set means coherent.

use std::fmt;

use serde::{Deserialize, Serialize};
use spyglass_header::{MatchHeader, MissionSet};

use crate::timeline::{MatchTimeline, Role, TimelineCategory, TimelineEvent};

bitflags::bitflags! {
    /// Reasons a timeline disagrees with its header
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Coherency: u32 {
        /// Assembly never produced a timeline; no other check runs
        const NO_TIMELINE = 1 << 0;
        const NO_GAME_START = 1 << 1;
        const NO_GAME_END = 1 << 2;
        /// Clock went up without a time extension just before
        const TIME_REWIND = 1 << 3;
        /// Some book color slots filled, others empty
        const BOOK_MISSING_COLOR = 1 << 4;
        const PICKED_MISSIONS_MISMATCH = 1 << 5;
        const SELECTED_MISSIONS_MISMATCH = 1 << 6;
        const COMPLETED_MISSIONS_MISMATCH = 1 << 7;
        const GUEST_COUNT_MISMATCH = 1 << 8;
        const START_CLOCK_MISMATCH = 1 << 9;
        const CHARACTER_NOT_ASSIGNED_ROLE = 1 << 10;
        const ROLE_WITH_NO_CHARACTER = 1 << 11;
        const SPY_NOT_CAST_IN_BEGINNING = 1 << 12;
    }
}

impl Coherency {
    pub fn is_coherent(self) -> bool {
        self.is_empty()
    }

    /// Names of the violated rules
    pub fn reasons(self) -> impl Iterator<Item = &'static str> {
        self.iter_names().map(|(name, _)| name)
    }
}

impl fmt::Display for Coherency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("coherent");
        }
        let reasons: Vec<&str> = self.reasons().collect();
        f.write_str(&reasons.join(", "))
    }
}

/// Categories allowed to precede the spy's cast event
const BEFORE_SPY_CAST: TimelineCategory = TimelineCategory::SNIPER_LIGHTS
    .union(TimelineCategory::MISSION_ENABLED)
    .union(TimelineCategory::MISSION_SELECTED);

/// Check a timeline against its header
pub fn validate(timeline: Option<&MatchTimeline>, header: &MatchHeader) -> Coherency {
    let Some(timeline) = timeline else {
        return Coherency::NO_TIMELINE;
    };

    let mut result = Coherency::empty();

    if !timeline.iter().any(|e| e.raw.is(TimelineCategory::GAME_START)) {
        result |= Coherency::NO_GAME_START;
    }
    if !timeline.iter().any(|e| e.raw.is(TimelineCategory::GAME_END)) {
        result |= Coherency::NO_GAME_END;
    }

    if has_time_rewind(timeline.events()) {
        result |= Coherency::TIME_REWIND;
    }

    if timeline.iter().any(|e| book_missing_color(e)) {
        result |= Coherency::BOOK_MISSING_COLOR;
    }

    let missions = [
        (
            TimelineCategory::MISSION_ENABLED,
            header.picked_missions,
            Coherency::PICKED_MISSIONS_MISMATCH,
        ),
        (
            TimelineCategory::MISSION_SELECTED,
            header.selected_missions,
            Coherency::SELECTED_MISSIONS_MISMATCH,
        ),
        (
            TimelineCategory::MISSION_COMPLETE,
            header.completed_missions,
            Coherency::COMPLETED_MISSIONS_MISMATCH,
        ),
    ];
    for (category, expected, flag) in missions {
        if mission_union(timeline, category) != expected {
            result |= flag;
        }
    }

    if let Some(guests) = header.guest_count {
        let casts = timeline
            .iter()
            .filter(|e| e.raw.is(TimelineCategory::CAST))
            .count();
        if casts != guests as usize {
            result |= Coherency::GUEST_COUNT_MISMATCH;
        }
    }

    if let Some(clock) = header.start_clock_secs {
        if timeline.first().raw.time_remaining != clock as f32 {
            result |= Coherency::START_CLOCK_MISMATCH;
        }
    }

    for event in timeline.iter().filter(|e| e.raw.is(TimelineCategory::CAST)) {
        match (event.raw.role, event.raw.character) {
            (None, Some(_)) => result |= Coherency::CHARACTER_NOT_ASSIGNED_ROLE,
            (Some(_), None) => result |= Coherency::ROLE_WITH_NO_CHARACTER,
            _ => {}
        }
    }

    if !spy_cast_first(timeline) {
        result |= Coherency::SPY_NOT_CAST_IN_BEGINNING;
    }

    result
}

/// Remaining time may only go up right after a time extension
fn has_time_rewind(events: &[TimelineEvent]) -> bool {
    events.windows(2).any(|pair| {
        let (prev, next) = (&pair[0].raw, &pair[1].raw);
        next.time_remaining > prev.time_remaining && !prev.is(TimelineCategory::TIME_ADD)
    })
}

fn book_missing_color(event: &TimelineEvent) -> bool {
    let books = &event.raw.books;
    books.len() > 1 && books.iter().any(Option::is_none)
}

fn mission_union(timeline: &MatchTimeline, category: TimelineCategory) -> MissionSet {
    timeline
        .iter()
        .filter(|e| e.raw.is(category))
        .filter_map(|e| e.raw.mission)
        .collect()
}

fn spy_cast_first(timeline: &MatchTimeline) -> bool {
    for event in timeline {
        let raw = &event.raw;
        if raw.is(TimelineCategory::CAST) && raw.role == Some(Role::Spy) {
            return true;
        }
        if raw.category.is_empty() || !BEFORE_SPY_CAST.contains(raw.category) {
            return false;
        }
    }
    false
}
