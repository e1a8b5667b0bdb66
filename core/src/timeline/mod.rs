//! Match timeline model
//!
//! Events read from the in-game timeline, and the assembled per-match sequence.

mod types;

pub use types::{
    ActionTest, Actor, BookColor, BookSlots, Character, MatchId, MatchTimeline, RawEvent, Role,
    TimelineCategory, TimelineEvent,
};
