//! Per-version header layouts
//!
//! Each supported version is plain offset data. Versions share no behavior
//! beyond where their fields live, so decoding is one routine driven by the
//! table below.
//!
//! ```text
//! field                 v3     v4     v5
//! magic                 0x00   0x00   0x00
//! version               0x04   0x04   0x04
//! duration (f32)        0x14   0x14   0x14
//! uuid (16 bytes)       0x18   0x18   0x18
//! timestamp (u32)       0x28   0x28   0x28
//! sequence (u16)        0x2C   0x2C   0x2C
//! spy name len          0x2E   0x2E   0x2E
//! sniper name len       0x2F   0x2F   0x2F
//! spy display len        -      -     0x30
//! sniper display len     -      -     0x31
//! outcome (u32)         0x30   0x30   0x34
//! game mode (u32)       0x34   0x34   0x38
//! venue hash (u32)      0x38   0x38   0x3C
//! selected missions     0x3C   0x3C   0x40
//! picked missions       0x40   0x40   0x44
//! completed missions    0x44   0x44   0x48
//! guest count (u32)      -     0x48   0x4C
//! start clock (u32)      -     0x4C   0x50
//! venue variant (u32)    -      -     0x54
//! names start           0x50   0x50   0x64
//! ```

/// Byte offsets of every field for one header version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    pub version: u8,
    pub duration: usize,
    pub uuid: usize,
    pub timestamp: usize,
    pub sequence: usize,
    pub spy_name_len: usize,
    pub sniper_name_len: usize,
    /// Spy and sniper display-name lengths, when the layout carries them
    pub display_name_lens: Option<(usize, usize)>,
    pub outcome: usize,
    pub game_mode: usize,
    pub venue: usize,
    pub selected_missions: usize,
    pub picked_missions: usize,
    pub completed_missions: usize,
    pub guest_count: Option<usize>,
    pub start_clock: Option<usize>,
    pub variant: Option<usize>,
    /// Start of the packed name region; also the end of the fixed fields
    pub names_start: usize,
}

impl HeaderLayout {
    /// Whether this layout stores display names after the account names
    pub fn has_display_names(&self) -> bool {
        self.display_name_lens.is_some()
    }
}

static LAYOUTS: [HeaderLayout; 3] = [
    HeaderLayout {
        version: 3,
        duration: 0x14,
        uuid: 0x18,
        timestamp: 0x28,
        sequence: 0x2C,
        spy_name_len: 0x2E,
        sniper_name_len: 0x2F,
        display_name_lens: None,
        outcome: 0x30,
        game_mode: 0x34,
        venue: 0x38,
        selected_missions: 0x3C,
        picked_missions: 0x40,
        completed_missions: 0x44,
        guest_count: None,
        start_clock: None,
        variant: None,
        names_start: 0x50,
    },
    HeaderLayout {
        version: 4,
        duration: 0x14,
        uuid: 0x18,
        timestamp: 0x28,
        sequence: 0x2C,
        spy_name_len: 0x2E,
        sniper_name_len: 0x2F,
        display_name_lens: None,
        outcome: 0x30,
        game_mode: 0x34,
        venue: 0x38,
        selected_missions: 0x3C,
        picked_missions: 0x40,
        completed_missions: 0x44,
        guest_count: Some(0x48),
        start_clock: Some(0x4C),
        variant: None,
        names_start: 0x50,
    },
    HeaderLayout {
        version: 5,
        duration: 0x14,
        uuid: 0x18,
        timestamp: 0x28,
        sequence: 0x2C,
        spy_name_len: 0x2E,
        sniper_name_len: 0x2F,
        display_name_lens: Some((0x30, 0x31)),
        outcome: 0x34,
        game_mode: 0x38,
        venue: 0x3C,
        selected_missions: 0x40,
        picked_missions: 0x44,
        completed_missions: 0x48,
        guest_count: Some(0x4C),
        start_clock: Some(0x50),
        variant: Some(0x54),
        names_start: 0x64,
    },
];

/// Look up the layout for a version byte
pub fn layout_for(version: u8) -> Option<&'static HeaderLayout> {
    LAYOUTS.iter().find(|layout| layout.version == version)
}

/// All known layouts, oldest first
pub fn known_layouts() -> &'static [HeaderLayout] {
    &LAYOUTS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MIN_HEADER_LEN;

    #[test]
    fn test_known_versions() {
        assert!(layout_for(3).is_some());
        assert!(layout_for(4).is_some());
        assert!(layout_for(5).is_some());
        assert!(layout_for(2).is_none());
        assert!(layout_for(6).is_none());
    }

    #[test]
    fn test_min_len_is_smallest_fixed_region() {
        let smallest = known_layouts()
            .iter()
            .map(|l| l.names_start)
            .min()
            .unwrap();
        assert_eq!(smallest, MIN_HEADER_LEN);
    }

    #[test]
    fn test_fixed_fields_fit_before_names() {
        for layout in known_layouts() {
            let mut ends = vec![
                layout.duration + 4,
                layout.uuid + 16,
                layout.timestamp + 4,
                layout.sequence + 2,
                layout.outcome + 4,
                layout.game_mode + 4,
                layout.venue + 4,
                layout.completed_missions + 4,
            ];
            ends.extend(layout.guest_count.map(|o| o + 4));
            ends.extend(layout.start_clock.map(|o| o + 4));
            ends.extend(layout.variant.map(|o| o + 4));
            for end in ends {
                assert!(end <= layout.names_start, "v{}", layout.version);
            }
        }
    }

    #[test]
    fn test_only_v5_has_display_names() {
        assert!(!layout_for(3).unwrap().has_display_names());
        assert!(!layout_for(4).unwrap().has_display_names());
        assert!(layout_for(5).unwrap().has_display_names());
    }
}
