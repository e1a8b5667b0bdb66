//! Decoded header types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::venue::{Venue, VenueVariant};

/// Match metadata decoded from a replay file's header
///
/// Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchHeader {
    /// Layout version the header was decoded with
    pub version: u8,
    pub spy: PlayerNames,
    pub sniper: PlayerNames,
    pub outcome: Outcome,
    pub venue: Venue,
    /// Venue sub-variant, when the layout and venue carry one
    pub variant: Option<VenueVariant>,
    pub game_mode: GameMode,
    pub selected_missions: MissionSet,
    pub picked_missions: MissionSet,
    pub completed_missions: MissionSet,
    /// Match duration in whole seconds
    pub duration_secs: u32,
    pub start_time: DateTime<Utc>,
    /// 16-byte identifier, base64url without padding
    pub uuid: String,
    pub sequence: u16,
    pub guest_count: Option<u32>,
    /// Clock value the match started with, in seconds
    pub start_clock_secs: Option<u32>,
}

/// Account name plus the name shown in game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerNames {
    pub account: String,
    /// Same as `account` when the replay records no separate display name
    pub display: String,
}

impl PlayerNames {
    /// Build from an account name and an optional display name
    ///
    /// An empty display name means "same as account".
    pub fn new(account: String, display: Option<String>) -> Self {
        let display = match display {
            Some(name) if !name.is_empty() => name,
            _ => account.clone(),
        };
        Self { account, display }
    }
}

impl fmt::Display for PlayerNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.account == self.display {
            write!(f, "{}", self.account)
        } else {
            write!(f, "{} ({})", self.display, self.account)
        }
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// How a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Spy completed the required missions
    MissionsWin,
    /// Clock ran out on the spy
    SpyTimeout,
    /// Sniper shot the spy
    SpyShot,
    /// Sniper shot a civilian
    CivilianShot,
}

impl Outcome {
    /// Map the raw header value; `None` for unmapped values such as "in progress"
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::MissionsWin),
            1 => Some(Self::SpyTimeout),
            2 => Some(Self::SpyShot),
            3 => Some(Self::CivilianShot),
            _ => None,
        }
    }

    pub fn spy_won(self) -> bool {
        matches!(self, Self::MissionsWin | Self::CivilianShot)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissionsWin => "Missions Win",
            Self::SpyTimeout => "Time Out",
            Self::SpyShot => "Spy Shot",
            Self::CivilianShot => "Civilian Shot",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Game mode
// =============================================================================

const MODE_FAMILY_SHIFT: u32 = 28;
const MODE_COUNT_BITS: u32 = 14;
const MODE_COUNT_MASK: u32 = (1 << MODE_COUNT_BITS) - 1;

/// Mission rule family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeFamily {
    /// All selected missions must be done (`k`)
    Known,
    /// Spy picks which of the available missions count (`p`)
    Pick,
    /// Any of the available missions count (`a`)
    Any,
}

impl ModeFamily {
    pub fn letter(self) -> char {
        match self {
            Self::Known => 'k',
            Self::Pick => 'p',
            Self::Any => 'a',
        }
    }
}

/// Game mode: family plus required/available mission counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameMode {
    pub family: ModeFamily,
    pub required: u16,
    pub available: u16,
}

impl GameMode {
    /// Decode the packed 32-bit mode field
    ///
    /// Top 4 bits select the family, bits 14..28 hold the available count and
    /// bits 0..14 the required count.
    pub fn from_raw(raw: u32) -> Result<Self, DecodeError> {
        let family = match raw >> MODE_FAMILY_SHIFT {
            0 => ModeFamily::Known,
            1 => ModeFamily::Pick,
            2 => ModeFamily::Any,
            _ => return Err(DecodeError::UnknownGameMode(raw)),
        };
        let available = ((raw >> MODE_COUNT_BITS) & MODE_COUNT_MASK) as u16;
        let required = (raw & MODE_COUNT_MASK) as u16;
        Ok(Self {
            family,
            required,
            available,
        })
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.family {
            ModeFamily::Known => write!(f, "{}{}", self.family.letter(), self.required),
            _ => write!(
                f,
                "{}{}/{}",
                self.family.letter(),
                self.required,
                self.available
            ),
        }
    }
}

// =============================================================================
// Missions
// =============================================================================

/// One of the eight mission kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mission {
    BugAmbassador,
    ContactDoubleAgent,
    TransferMicrofilm,
    SwapStatue,
    InspectStatues,
    SeduceTarget,
    PurloinGuestList,
    FingerprintAmbassador,
}

impl Mission {
    pub const ALL: [Mission; 8] = [
        Mission::BugAmbassador,
        Mission::ContactDoubleAgent,
        Mission::TransferMicrofilm,
        Mission::SwapStatue,
        Mission::InspectStatues,
        Mission::SeduceTarget,
        Mission::PurloinGuestList,
        Mission::FingerprintAmbassador,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::BugAmbassador => "Bug",
            Self::ContactDoubleAgent => "Contact",
            Self::TransferMicrofilm => "Transfer",
            Self::SwapStatue => "Swap",
            Self::InspectStatues => "Inspect",
            Self::SeduceTarget => "Seduce",
            Self::PurloinGuestList => "Purloin",
            Self::FingerprintAmbassador => "Fingerprint",
        }
    }
}

bitflags::bitflags! {
    /// Set of missions, one bit per kind
    ///
    /// Bit positions match the header encoding and carry no ordering meaning.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct MissionSet: u8 {
        const BUG_AMBASSADOR = 1 << 0;
        const CONTACT_DOUBLE_AGENT = 1 << 1;
        const TRANSFER_MICROFILM = 1 << 2;
        const SWAP_STATUE = 1 << 3;
        const INSPECT_STATUES = 1 << 4;
        const SEDUCE_TARGET = 1 << 5;
        const PURLOIN_GUEST_LIST = 1 << 6;
        const FINGERPRINT_AMBASSADOR = 1 << 7;
    }
}

/// Header bit for each mission kind
pub const MISSION_BITS: [(Mission, MissionSet); 8] = [
    (Mission::BugAmbassador, MissionSet::BUG_AMBASSADOR),
    (Mission::ContactDoubleAgent, MissionSet::CONTACT_DOUBLE_AGENT),
    (Mission::TransferMicrofilm, MissionSet::TRANSFER_MICROFILM),
    (Mission::SwapStatue, MissionSet::SWAP_STATUE),
    (Mission::InspectStatues, MissionSet::INSPECT_STATUES),
    (Mission::SeduceTarget, MissionSet::SEDUCE_TARGET),
    (Mission::PurloinGuestList, MissionSet::PURLOIN_GUEST_LIST),
    (Mission::FingerprintAmbassador, MissionSet::FINGERPRINT_AMBASSADOR),
];

impl MissionSet {
    /// Decode an 8-bit mission mask through the fixed bit table
    pub fn from_mask(mask: u8) -> Self {
        MISSION_BITS
            .iter()
            .filter(|(_, bit)| mask & bit.bits() != 0)
            .fold(MissionSet::empty(), |set, (_, bit)| set | *bit)
    }

    /// Iterate the missions in the set
    pub fn missions(self) -> impl Iterator<Item = Mission> {
        MISSION_BITS
            .into_iter()
            .filter(move |(_, bit)| self.contains(*bit))
            .map(|(mission, _)| mission)
    }
}

impl From<Mission> for MissionSet {
    fn from(mission: Mission) -> Self {
        MISSION_BITS
            .iter()
            .find(|(m, _)| *m == mission)
            .map(|(_, bit)| *bit)
            .unwrap_or(MissionSet::empty())
    }
}

impl FromIterator<Mission> for MissionSet {
    fn from_iter<I: IntoIterator<Item = Mission>>(iter: I) -> Self {
        iter.into_iter()
            .fold(MissionSet::empty(), |set, mission| set | mission.into())
    }
}
