//! Screenshot classification seam
//!
//! Turning pixels into timeline lines is done by an external recognizer. The
//! pipeline only needs this contract: one screenshot in, the ordered lines it
//! shows out, or a failure that loses the piece for good.

use image::RgbaImage;
use thiserror::Error;

use crate::timeline::RawEvent;

/// Classifier failure for a single screenshot
///
/// Never retried. The piece is recorded as lost and its match cannot complete.
#[derive(Debug, Clone, Error)]
#[error("recognition failed: {0}")]
pub struct RecognitionError(pub String);

impl RecognitionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Reads timeline lines off one screenshot
///
/// Called concurrently from every classifier worker.
pub trait EventClassifier: Send + Sync {
    /// Lines visible in `image`, top to bottom
    fn classify(&self, image: &RgbaImage) -> Result<Vec<RawEvent>, RecognitionError>;
}

impl<F> EventClassifier for F
where
    F: Fn(&RgbaImage) -> Result<Vec<RawEvent>, RecognitionError> + Send + Sync,
{
    fn classify(&self, image: &RgbaImage) -> Result<Vec<RawEvent>, RecognitionError> {
        self(image)
    }
}
