//! Spyglass Core - timeline reconstruction for spy/sniper replays
//!
//! Each replay carries a binary header (decoded by `spyglass-header`) and a
//! visual timeline that is captured screenshot by screenshot and read by an
//! external classifier. This crate merges the two into one validated
//! timeline per match.
//!
//! # Architecture
//!
//! - [`timeline`] - Event, category and timeline types
//! - [`reconcile`] - Out-of-order piece assembly with overlap removal
//! - [`coherency`] - Header/timeline cross-checks
//! - [`pipeline`] - Sequential capture, parallel classification, commit
//! - [`classify`] - The classifier contract
//! - [`config`] - TOML settings

pub mod classify;
pub mod coherency;
pub mod config;
#[cfg(test)]
mod integration;
pub mod pipeline;
pub mod reconcile;
#[cfg(test)]
pub mod test_utils;
pub mod timeline;

pub use classify::{EventClassifier, RecognitionError};
pub use coherency::{Coherency, validate};
pub use config::Config;
pub use pipeline::{
    BatchReport, CaptureError, CaptureSource, MatchJob, Pipeline, PipelineError, TimelineSink,
};
pub use reconcile::{AssemblyConfig, Delivery, FragmentKey, Reconciler, StartClockPolicy};
pub use timeline::{MatchId, MatchTimeline, RawEvent, TimelineCategory, TimelineEvent};

pub use spyglass_header::{DecodeError, MatchHeader, decode};
