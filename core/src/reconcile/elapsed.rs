//! Elapsed-time derivation
//!
//! Classified lines carry the time left on the clock. Elapsed time is
//! `start_clock - remaining`, where the start clock is either the first
//! observed remaining time or the header's recorded value.

use serde::{Deserialize, Serialize};

use crate::timeline::{RawEvent, TimelineEvent};

/// Where the start-clock reference comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StartClockPolicy {
    /// Use the first event's remaining time
    #[default]
    FirstObserved,
    /// Use the header's start clock when known, else the first event
    PreferHeader,
}

/// Pick the start-clock reference for a match
pub fn start_clock_reference(
    events: &[RawEvent],
    header_clock: Option<f32>,
    policy: StartClockPolicy,
) -> Option<f32> {
    let first = events.first().map(|e| e.time_remaining);
    match policy {
        StartClockPolicy::FirstObserved => first,
        StartClockPolicy::PreferHeader => header_clock.or(first),
    }
}

/// Attach elapsed time to every event
///
/// Monotonicity is not enforced here; a time extension makes the following
/// elapsed values step back.
pub fn derive_elapsed(
    events: Vec<RawEvent>,
    header_clock: Option<f32>,
    policy: StartClockPolicy,
) -> Vec<TimelineEvent> {
    let Some(reference) = start_clock_reference(&events, header_clock, policy) else {
        return Vec::new();
    };

    events
        .into_iter()
        .map(|raw| TimelineEvent {
            elapsed: reference - raw.time_remaining,
            raw,
        })
        .collect()
}
