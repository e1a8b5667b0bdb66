//! Core types for the match timeline
//!
//! A [`RawEvent`] is one line of the in-game timeline as read off a screenshot.
//! Once pieces are assembled, each line gains a derived elapsed time and
//! becomes a [`TimelineEvent`]; the ordered list is a [`MatchTimeline`].

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;
use spyglass_header::Mission;

/// Identity of a match across capture, classification and commit
///
/// Wraps the header UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub String);

impl MatchId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MatchId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who an event is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    Spy,
    Sniper,
    /// Events the game itself emits (start, end, cast, clock)
    Game,
}

bitflags::bitflags! {
    /// Semantic categories of a timeline event
    ///
    /// An event may carry several, e.g. `ACTION_TEST | MISSION_PARTIAL`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TimelineCategory: u32 {
        const CAST = 1 << 0;
        const MISSION_ENABLED = 1 << 1;
        const MISSION_SELECTED = 1 << 2;
        const MISSION_COMPLETE = 1 << 3;
        const MISSION_PARTIAL = 1 << 4;
        const ACTION_TEST = 1 << 5;
        const ACTION_TRIGGERED = 1 << 6;
        const SNIPER_LIGHTS = 1 << 7;
        const SNIPER_SHOT = 1 << 8;
        const GAME_START = 1 << 9;
        const GAME_END = 1 << 10;
        const SCRIPTED_EXCUSE = 1 << 11;
        const CONVERSATION = 1 << 12;
        const TIME_ADD = 1 << 13;
        const OVERTIME = 1 << 14;
        const DRINKS = 1 << 15;
        const BOOKS = 1 << 16;
        const STATUES = 1 << 17;
        const BRIEFCASE = 1 << 18;
        const WATCH_CHECK = 1 << 19;
        const MICROFILM = 1 << 20;
        const BANANA_BREAD = 1 << 21;
    }
}

/// Result of a contested action test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionTest {
    White,
    Green,
    Orange,
    Red,
    Ignored,
    Canceled,
}

/// Book color tag on book and microfilm events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookColor {
    Blue,
    Green,
}

/// Role assigned to a character by a cast event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Spy,
    Ambassador,
    DoubleAgent,
    SuspectedDoubleAgent,
    SeductionTarget,
    Civilian,
    Staff,
}

/// Closed cast of guest characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Character {
    Bling,
    Boots,
    Carlos,
    Damon,
    Dave,
    Disney,
    Duke,
    Helen,
    Irish,
    Morgan,
    Oprah,
    Plain,
    Queen,
    Rocker,
    Salmon,
    Sari,
    Sikh,
    Smallman,
    Taft,
    Teal,
    Toby,
    Wheels,
}

/// Book color slots; empty for events that carry no color
pub type BookSlots = SmallVec<[Option<BookColor>; 2]>;

/// One timeline line as produced by the classifier
///
/// Two raw events are the same line iff every field matches; overlap removal
/// relies on this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub actor: Actor,
    /// Seconds left on the match clock when the event happened
    pub time_remaining: f32,
    pub description: String,
    pub category: TimelineCategory,
    #[serde(default)]
    pub mission: Option<Mission>,
    #[serde(default)]
    pub action_test: Option<ActionTest>,
    #[serde(default)]
    pub books: BookSlots,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub character: Option<Character>,
}

impl RawEvent {
    /// Create an event with no mission, test, book, or cast data
    pub fn new(
        actor: Actor,
        time_remaining: f32,
        description: impl Into<String>,
        category: TimelineCategory,
    ) -> Self {
        Self {
            actor,
            time_remaining,
            description: description.into(),
            category,
            mission: None,
            action_test: None,
            books: SmallVec::new(),
            role: None,
            character: None,
        }
    }

    pub fn with_mission(mut self, mission: Mission) -> Self {
        self.mission = Some(mission);
        self
    }

    pub fn with_action_test(mut self, test: ActionTest) -> Self {
        self.action_test = Some(test);
        self
    }

    pub fn with_books(mut self, books: &[Option<BookColor>]) -> Self {
        self.books = books.iter().copied().collect();
        self
    }

    pub fn with_cast(mut self, role: Option<Role>, character: Option<Character>) -> Self {
        self.role = role;
        self.character = character;
        self
    }

    pub fn is(&self, category: TimelineCategory) -> bool {
        self.category.intersects(category)
    }
}

/// Timeline line with its derived elapsed time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    #[serde(flatten)]
    pub raw: RawEvent,
    /// Seconds since the match started
    pub elapsed: f32,
}

/// Ordered, non-empty sequence of timeline events for one match
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MatchTimeline {
    events: Vec<TimelineEvent>,
}

impl MatchTimeline {
    /// Wrap an assembled event list; `None` if it is empty
    pub fn new(events: Vec<TimelineEvent>) -> Option<Self> {
        if events.is_empty() {
            None
        } else {
            Some(Self { events })
        }
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimelineEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn first(&self) -> &TimelineEvent {
        &self.events[0]
    }

    pub fn last(&self) -> &TimelineEvent {
        &self.events[self.events.len() - 1]
    }

    pub fn into_events(self) -> Vec<TimelineEvent> {
        self.events
    }
}

impl<'de> Deserialize<'de> for MatchTimeline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let events = Vec::<TimelineEvent>::deserialize(deserializer)?;
        Self::new(events).ok_or_else(|| D::Error::invalid_length(0, &"at least one event"))
    }
}

impl<'a> IntoIterator for &'a MatchTimeline {
    type Item = &'a TimelineEvent;
    type IntoIter = std::slice::Iter<'a, TimelineEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
