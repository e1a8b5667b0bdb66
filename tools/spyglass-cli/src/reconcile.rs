//! Reconcile command - replay a recorded fragment dump through assembly and validation
//!
//! The dump is a JSON array of pieces as the classifier produced them:
//!
//! ```json
//! [
//!   { "piece_index": 1, "events": [ ... ] },
//!   { "piece_index": 2, "events": null },
//!   { "piece_index": 3, "is_last": true, "events": [ ... ] }
//! ]
//! ```
//!
//! `"events": null` marks a piece whose classification failed.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use spyglass_core::config;
use spyglass_core::pipeline::read_header;
use spyglass_core::reconcile::{
    AbandonedMatch, AssemblyConfig, Delivery, FragmentRecord, Reconciler, StartClockPolicy,
};
use spyglass_core::timeline::{MatchId, MatchTimeline};
use spyglass_core::{Coherency, validate};
use spyglass_header::MatchHeader;
use tracing::info;

/// Arguments for the reconcile command
#[derive(Args)]
pub struct ReconcileArgs {
    /// Replay file the fragments belong to
    pub replay: PathBuf,

    /// JSON fragment dump
    pub fragments: PathBuf,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// Measure elapsed time from the header's start clock
    #[arg(long)]
    pub prefer_header_clock: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    header: MatchHeader,
    violations: Coherency,
    timeline: Option<MatchTimeline>,
    abandoned: Option<AbandonedMatch>,
}

/// Execute the reconcile command
pub fn execute(args: ReconcileArgs) -> Result<()> {
    let header = read_header(&args.replay)?;
    let fragments = read_fragments(&args.fragments)?;

    let mut assembly = config::load().assembly;
    if args.prefer_header_clock {
        assembly.start_clock = StartClockPolicy::PreferHeader;
    }

    let outcome = reconcile(header, fragments, assembly);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_summary(&outcome);
    }

    if !outcome.violations.is_coherent() {
        bail!("timeline rejected: {}", outcome.violations);
    }
    Ok(())
}

fn read_fragments(path: &Path) -> Result<Vec<FragmentRecord>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn reconcile(
    header: MatchHeader,
    fragments: Vec<FragmentRecord>,
    assembly: AssemblyConfig,
) -> Report {
    let match_id = MatchId(header.uuid.clone());
    let mut reconciler = Reconciler::new(assembly);
    if let Some(clock) = header.start_clock_secs {
        reconciler.register_start_clock(&match_id, clock as f32);
    }

    let mut timeline = None;
    for fragment in fragments {
        let key = fragment.key();
        match fragment.events {
            Some(events) => {
                if let Delivery::Completed(assembled) = reconciler.deliver(&match_id, key, events) {
                    timeline = assembled;
                }
            }
            None => reconciler.record_lost(&match_id, key.piece_index),
        }
    }

    let abandoned = reconciler.abandon_all().into_iter().next();
    let violations = validate(timeline.as_ref(), &header);
    info!(%match_id, %violations, "reconciled");

    Report {
        header,
        violations,
        timeline,
        abandoned,
    }
}

fn print_summary(outcome: &Report) {
    println!("{}", crate::decode::summarize(&outcome.header));
    match &outcome.timeline {
        Some(timeline) => println!(
            "  timeline: {} events, {:.1}s elapsed at last event",
            timeline.len(),
            timeline.last().elapsed
        ),
        None => println!("  timeline: none"),
    }
    if let Some(abandoned) = &outcome.abandoned {
        println!(
            "  incomplete: received pieces {:?}, lost {:?}",
            abandoned.received, abandoned.lost
        );
    }
    println!("  coherency: {}", outcome.violations);
}
