//! Error types for replay header decoding

/// Errors that can occur when decoding a replay header
///
/// Every variant is final for the buffer that produced it: decoding the same
/// bytes again yields the same error. Callers attach the file name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Buffer is shorter than the fixed part of the header
    #[error("header too short: {len} bytes (need at least {min})")]
    TooShort { len: usize, min: usize },

    /// Magic bytes do not match (expected "RPLY")
    #[error("not a replay file (expected 'RPLY' magic)")]
    NotAReplay,

    /// Version byte names no known layout
    #[error("unsupported header version: {0}")]
    UnsupportedVersion(u8),

    /// Venue hash is not in the venue table
    #[error("unknown venue hash 0x{0:08X}")]
    UnknownVenue(u32),

    /// Outcome value has no mapping (includes matches still in progress)
    #[error("unknown match outcome: {0}")]
    UnknownOutcome(u32),

    /// Game-mode family bits name no known family
    #[error("unknown game mode 0x{0:08X}")]
    UnknownGameMode(u32),

    /// A length-prefixed name runs past the end of the buffer
    #[error("{field} name at offset 0x{offset:X} with length {len} runs past end of header")]
    NameOutOfBounds {
        field: &'static str,
        offset: usize,
        len: usize,
    },
}
