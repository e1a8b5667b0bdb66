//! Replay header decoder

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};

use crate::error::DecodeError;
use crate::header::{GameMode, MatchHeader, MissionSet, Outcome, PlayerNames};
use crate::layout::{HeaderLayout, layout_for};
use crate::venue::Venue;
use crate::{MIN_HEADER_LEN, REPLAY_MAGIC, VERSION_OFFSET};

mod helpers;

use helpers::{read_bytes, read_f32, read_name, read_u8, read_u16, read_u32};

/// Decode a replay header from raw file bytes
///
/// Checks run in a fixed order: minimum length, magic, version, then the
/// version's own fixed region, names, venue and outcome.
///
/// # Arguments
/// * `data` - Raw replay file bytes (at least the header)
///
/// # Returns
/// * `Ok(MatchHeader)` - Decoded header
/// * `Err(DecodeError)` - Decode failure; the caller attaches the file name
pub fn decode(data: &[u8]) -> Result<MatchHeader, DecodeError> {
    if data.len() < MIN_HEADER_LEN {
        return Err(DecodeError::TooShort {
            len: data.len(),
            min: MIN_HEADER_LEN,
        });
    }

    if &data[0..4] != REPLAY_MAGIC {
        return Err(DecodeError::NotAReplay);
    }

    let version = data[VERSION_OFFSET];
    let layout = layout_for(version).ok_or(DecodeError::UnsupportedVersion(version))?;

    // Newer layouts have a longer fixed region than the global minimum
    if data.len() < layout.names_start {
        return Err(DecodeError::TooShort {
            len: data.len(),
            min: layout.names_start,
        });
    }

    let duration_secs = read_f32(data, layout.duration)? as u32;
    let uuid = URL_SAFE_NO_PAD.encode(read_bytes::<16>(data, layout.uuid)?);
    let timestamp = read_u32(data, layout.timestamp)?;
    let start_time = DateTime::<Utc>::from_timestamp(i64::from(timestamp), 0).unwrap_or_default();
    let sequence = read_u16(data, layout.sequence)?;

    let (spy, sniper) = read_names(data, layout)?;

    let selected_missions = MissionSet::from_mask(read_u8(data, layout.selected_missions)?);
    let picked_missions = MissionSet::from_mask(read_u8(data, layout.picked_missions)?);
    let completed_missions = MissionSet::from_mask(read_u8(data, layout.completed_missions)?);

    let game_mode = GameMode::from_raw(read_u32(data, layout.game_mode)?)?;

    let venue_hash = read_u32(data, layout.venue)?;
    let venue = Venue::from_hash(venue_hash).ok_or(DecodeError::UnknownVenue(venue_hash))?;

    let variant = match layout.variant {
        Some(offset) if !venue.variants().is_empty() => venue.variant(read_u32(data, offset)?),
        _ => None,
    };

    let raw_outcome = read_u32(data, layout.outcome)?;
    let outcome = Outcome::from_raw(raw_outcome).ok_or(DecodeError::UnknownOutcome(raw_outcome))?;

    let guest_count = layout
        .guest_count
        .map(|offset| read_u32(data, offset))
        .transpose()?;
    let start_clock_secs = layout
        .start_clock
        .map(|offset| read_u32(data, offset))
        .transpose()?;

    Ok(MatchHeader {
        version,
        spy,
        sniper,
        outcome,
        venue,
        variant,
        game_mode,
        selected_missions,
        picked_missions,
        completed_missions,
        duration_secs,
        start_time,
        uuid,
        sequence,
        guest_count,
        start_clock_secs,
    })
}

/// Read the packed name region
///
/// Order: spy account, sniper account, then (when the layout has them) spy
/// display and sniper display, contiguous with no separators.
fn read_names(
    data: &[u8],
    layout: &HeaderLayout,
) -> Result<(PlayerNames, PlayerNames), DecodeError> {
    let spy_len = usize::from(read_u8(data, layout.spy_name_len)?);
    let sniper_len = usize::from(read_u8(data, layout.sniper_name_len)?);

    let mut cursor = layout.names_start;
    let spy_account = read_name(data, cursor, spy_len, "spy")?;
    cursor += spy_len;
    let sniper_account = read_name(data, cursor, sniper_len, "sniper")?;
    cursor += sniper_len;

    let (spy_display, sniper_display) = match layout.display_name_lens {
        Some((spy_display_offset, sniper_display_offset)) => {
            let spy_display_len = usize::from(read_u8(data, spy_display_offset)?);
            let sniper_display_len = usize::from(read_u8(data, sniper_display_offset)?);

            let spy_display = read_name(data, cursor, spy_display_len, "spy display")?;
            cursor += spy_display_len;
            let sniper_display = read_name(data, cursor, sniper_display_len, "sniper display")?;
            (Some(spy_display), Some(sniper_display))
        }
        None => (None, None),
    };

    Ok((
        PlayerNames::new(spy_account, spy_display),
        PlayerNames::new(sniper_account, sniper_display),
    ))
}
