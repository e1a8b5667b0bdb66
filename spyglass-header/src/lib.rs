//! Spyglass header: replay header decoder
//!
//! Replay files for the two-player spy/sniper game end with a compact binary
//! header describing the match: who played which side, the venue, the game
//! mode, which missions were selected, picked and completed, how it ended, and
//! when it was played. This crate decodes that header. It performs no I/O.
//!
//! # Format Overview
//!
//! - 4-byte magic `RPLY`, then a version byte selecting one of three layouts
//! - Fixed fields at version-specific offsets (see [`layout`])
//! - Packed, length-prefixed player names after the fixed region
//!
//! All integers are little-endian.
//!
//! # Usage
//!
//! ```ignore
//! use spyglass_header::decode;
//!
//! let bytes = std::fs::read("match.replay")?;
//! let header = decode(&bytes)?;
//!
//! println!("{} vs {} on {}", header.spy, header.sniper, header.venue);
//! println!("Mode: {}", header.game_mode);
//! ```

mod error;
mod header;
pub mod layout;
mod parser;
mod venue;

pub use error::DecodeError;
pub use header::{
    GameMode, MISSION_BITS, MatchHeader, Mission, MissionSet, ModeFamily, Outcome, PlayerNames,
};
pub use layout::{HeaderLayout, layout_for};
pub use parser::decode;
pub use venue::{Venue, VenueVariant};

// =============================================================================
// Constants
// =============================================================================

/// Replay magic bytes "RPLY"
pub const REPLAY_MAGIC: &[u8; 4] = b"RPLY";

/// Offset of the layout version byte
pub const VERSION_OFFSET: usize = 0x04;

/// Smallest valid header: the fixed region of the oldest layout
pub const MIN_HEADER_LEN: usize = 0x50;
