//! Overlap removal between consecutive screenshot pieces
//!
//! Each capture re-scrolls so that the last few lines of one screenshot show
//! up again as the first lines of the next. The duplicated run is found by
//! matching the longest tail of the earlier piece against the head of the
//! later one.

use crate::timeline::RawEvent;

/// Default cap on the number of boundary lines compared
pub const DEFAULT_OVERLAP_WINDOW: usize = 32;

/// Length of the longest run that both ends `tail` and starts `head`
///
/// Runs longer than `window` are not considered.
pub fn overlap_len(tail: &[RawEvent], head: &[RawEvent], window: usize) -> usize {
    let max = window.min(tail.len()).min(head.len());
    (1..=max)
        .rev()
        .find(|&run| tail[tail.len() - run..] == head[..run])
        .unwrap_or(0)
}

/// Concatenate pieces in order, dropping each piece's overlap with the one before
pub fn concat_pieces<I>(pieces: I, window: usize) -> Vec<RawEvent>
where
    I: IntoIterator<Item = Vec<RawEvent>>,
{
    let mut out: Vec<RawEvent> = Vec::new();
    // The previous piece always sits intact at the end of `out`
    let mut prev_len = 0;

    for piece in pieces {
        // An empty piece has no boundary; compare across it
        if piece.is_empty() {
            continue;
        }
        let skip = overlap_len(&out[out.len() - prev_len..], &piece, window);
        prev_len = piece.len();
        out.extend(piece.into_iter().skip(skip));
    }

    out
}
