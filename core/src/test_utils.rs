//! Shared test fixtures for unit and integration tests
//!
//! One small, coherent match: a v5 header and the timeline that agrees with it.

use spyglass_header::{MatchHeader, Mission, decode};

use crate::reconcile::{FragmentKey, StartClockPolicy, derive_elapsed};
use crate::timeline::{
    ActionTest, Actor, BookColor, Character, MatchTimeline, RawEvent, Role, TimelineCategory,
};

// ============================================================================
// Header fixture
// ============================================================================

const BALLROOM: u32 = 0x5B12_1925;

/// v5 header bytes: k3 on Ballroom, 4 guests, 120 second clock
pub fn fixture_header_bytes() -> Vec<u8> {
    fixture_header_bytes_with_uuid([0x11; 16])
}

/// Same header with a caller-chosen 16-byte id
pub fn fixture_header_bytes_with_uuid(uuid: [u8; 16]) -> Vec<u8> {
    fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
        buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    let mut buf = vec![0u8; 0x64];
    buf[0..4].copy_from_slice(b"RPLY");
    buf[0x04] = 5;
    buf[0x14..0x18].copy_from_slice(&95.4f32.to_le_bytes());
    buf[0x18..0x28].copy_from_slice(&uuid);
    put_u32(&mut buf, 0x28, 1_700_000_000);
    buf[0x2C..0x2E].copy_from_slice(&1u16.to_le_bytes());
    buf[0x2E] = 9;
    buf[0x2F] = 12;
    put_u32(&mut buf, 0x34, 0);
    put_u32(&mut buf, 0x38, 3);
    put_u32(&mut buf, 0x3C, BALLROOM);
    buf[0x40] = 0b0010_0011;
    buf[0x44] = 0b0010_0011;
    buf[0x48] = 0b0010_0001;
    put_u32(&mut buf, 0x4C, 4);
    put_u32(&mut buf, 0x50, 120);
    buf.extend_from_slice(b"spyplayersniperplayer");
    buf
}

pub fn fixture_header() -> MatchHeader {
    decode(&fixture_header_bytes()).expect("fixture header decodes")
}

// ============================================================================
// Timeline fixture
// ============================================================================

fn cast(role: Role, character: Character, text: &str) -> RawEvent {
    RawEvent::new(Actor::Game, 120.0, text, TimelineCategory::CAST)
        .with_cast(Some(role), Some(character))
}

fn mission(category: TimelineCategory, mission: Mission, text: &str) -> RawEvent {
    RawEvent::new(Actor::Game, 120.0, text, category).with_mission(mission)
}

/// Events of the fixture match, in timeline order
///
/// Includes a time extension at 78.0 after which the clock jumps to 121.0.
pub fn fixture_events() -> Vec<RawEvent> {
    use TimelineCategory as C;

    vec![
        cast(Role::Spy, Character::Plain, "spy cast."),
        cast(Role::Ambassador, Character::Duke, "ambassador cast."),
        cast(Role::DoubleAgent, Character::Teal, "double agent cast."),
        cast(Role::SeductionTarget, Character::Helen, "seduction target cast."),
        mission(C::MISSION_SELECTED, Mission::BugAmbassador, "bug ambassador selected."),
        mission(C::MISSION_SELECTED, Mission::ContactDoubleAgent, "contact double agent selected."),
        mission(C::MISSION_SELECTED, Mission::SeduceTarget, "seduce target selected."),
        mission(C::MISSION_ENABLED, Mission::BugAmbassador, "bug ambassador enabled."),
        mission(C::MISSION_ENABLED, Mission::ContactDoubleAgent, "contact double agent enabled."),
        mission(C::MISSION_ENABLED, Mission::SeduceTarget, "seduce target enabled."),
        RawEvent::new(Actor::Game, 120.0, "game started.", C::GAME_START),
        RawEvent::new(Actor::Sniper, 110.5, "marked suspicious.", C::SNIPER_LIGHTS),
        RawEvent::new(Actor::Spy, 101.2, "action test green: seduce target", C::ACTION_TEST)
            .with_mission(Mission::SeduceTarget)
            .with_action_test(ActionTest::Green),
        mission(C::MISSION_COMPLETE, Mission::SeduceTarget, "target seduced.").at(95.0),
        RawEvent::new(
            Actor::Spy,
            80.0,
            "action triggered: check watch",
            C::ACTION_TRIGGERED | C::WATCH_CHECK,
        ),
        RawEvent::new(Actor::Spy, 78.0, "45 seconds added to match.", C::TIME_ADD),
        mission(C::MISSION_COMPLETE, Mission::BugAmbassador, "bugged ambassador while walking.")
            .at(121.0),
        RawEvent::new(Actor::Spy, 115.0, "put book on bookcase.", C::BOOKS)
            .with_books(&[Some(BookColor::Blue), Some(BookColor::Blue)]),
        RawEvent::new(Actor::Spy, 100.0, "spoke with double agent.", C::CONVERSATION),
        RawEvent::new(Actor::Game, 90.0, "game ended.", C::GAME_END),
    ]
}

trait At {
    fn at(self, time_remaining: f32) -> Self;
}

impl At for RawEvent {
    fn at(mut self, time_remaining: f32) -> Self {
        self.time_remaining = time_remaining;
        self
    }
}

/// Wrap events as a timeline using the first remaining time as start clock
pub fn timeline_from(events: Vec<RawEvent>) -> MatchTimeline {
    MatchTimeline::new(derive_elapsed(events, None, StartClockPolicy::FirstObserved))
        .expect("non-empty fixture timeline")
}

pub fn fixture_timeline() -> MatchTimeline {
    timeline_from(fixture_events())
}

/// The fixture timeline as three overlapping screenshot pieces
pub fn fixture_pieces() -> Vec<(FragmentKey, Vec<RawEvent>)> {
    let events = fixture_events();
    vec![
        (FragmentKey::new(1, false), events[0..8].to_vec()),
        (FragmentKey::new(2, false), events[6..15].to_vec()),
        (FragmentKey::new(3, true), events[13..].to_vec()),
    ]
}
