//! Capture seam
//!
//! Screenshots come from a single game client window driven by external
//! automation. Only one caller may drive it, so capture is strictly
//! sequential; the pipeline holds the source as `&mut`.

use std::thread;
use std::time::{Duration, Instant};

use image::RgbaImage;
use thiserror::Error;
use tracing::debug;

use super::jobs::MatchJob;
use crate::reconcile::FragmentKey;

/// Window or automation failure; fatal to the whole batch
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The window never became ready within the configured ceiling
    #[error("game window not ready after {waited:?}")]
    WindowTimeout {
        waited: Duration,
        /// Screenshot of whatever was on screen when we gave up
        diagnostic: Option<RgbaImage>,
    },
    #[error("capture automation failed: {0}")]
    Automation(String),
}

impl CaptureError {
    /// Diagnostic screenshot attached to a timeout, if any
    pub fn diagnostic(&self) -> Option<&RgbaImage> {
        match self {
            Self::WindowTimeout { diagnostic, .. } => diagnostic.as_ref(),
            Self::Automation(_) => None,
        }
    }
}

/// One screenshot of a match's timeline
#[derive(Debug, Clone)]
pub struct CapturedPiece {
    pub key: FragmentKey,
    pub image: RgbaImage,
}

/// Drives the game client window
pub trait CaptureSource {
    /// Whether the window is open, focused and showing the replay list
    fn window_ready(&mut self) -> bool;

    /// Grab whatever is on screen, for debugging a stuck window
    fn diagnostic_capture(&mut self) -> Option<RgbaImage>;

    /// Open the replay for `job` and scroll its timeline to the top
    fn begin_match(&mut self, job: &MatchJob) -> Result<(), CaptureError>;

    /// Next screenshot of the open match, or `None` once past the last one
    fn capture_next(&mut self) -> Result<Option<CapturedPiece>, CaptureError>;
}

/// Poll `window_ready` until it holds or `timeout` elapses
pub fn wait_for_window(
    source: &mut dyn CaptureSource,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<(), CaptureError> {
    let start = Instant::now();
    loop {
        if source.window_ready() {
            return Ok(());
        }
        let waited = start.elapsed();
        if waited >= timeout {
            return Err(CaptureError::WindowTimeout {
                waited,
                diagnostic: source.diagnostic_capture(),
            });
        }
        debug!(?waited, "waiting for game window");
        thread::sleep(poll_interval.min(timeout - waited));
    }
}
