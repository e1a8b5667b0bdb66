//! Decode command - summarize replay headers

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use rayon::prelude::*;
use serde::Serialize;
use spyglass_core::pipeline::read_header;
use spyglass_header::MatchHeader;

/// Arguments for the decode command
#[derive(Args)]
pub struct DecodeArgs {
    /// Replay files to decode
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print JSON instead of one line per file
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Decoded<'a> {
    path: &'a PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    header: Option<&'a MatchHeader>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Execute the decode command
///
/// Every file is attempted; the command fails afterwards if any did.
pub fn execute(args: DecodeArgs) -> Result<()> {
    let results: Vec<Result<MatchHeader>> =
        args.files.par_iter().map(|path| read_header(path)).collect();

    if args.json {
        let entries: Vec<Decoded> = args
            .files
            .iter()
            .zip(&results)
            .map(|(path, result)| Decoded {
                path,
                header: result.as_ref().ok(),
                error: result.as_ref().err().map(|err| format!("{err:#}")),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for (path, result) in args.files.iter().zip(&results) {
            match result {
                Ok(header) => println!("{}: {}", path.display(), summarize(header)),
                Err(err) => eprintln!("error: {err:#}"),
            }
        }
    }

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        bail!("{failed} of {} files failed to decode", results.len());
    }
    Ok(())
}

/// One-line description of a match
pub fn summarize(header: &MatchHeader) -> String {
    let venue = match header.variant {
        Some(variant) => format!("{} ({variant:?})", header.venue),
        None => header.venue.to_string(),
    };
    let missions: Vec<&str> = header.completed_missions.missions().map(|m| m.name()).collect();
    format!(
        "{} vs {} on {venue}, {} {}, {}s, completed [{}], {}",
        header.spy,
        header.sniper,
        header.game_mode,
        header.outcome,
        header.duration_secs,
        missions.join(", "),
        header.start_time.format("%Y-%m-%d %H:%M"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes() -> Vec<u8> {
        let mut buf = vec![0u8; 0x50];
        buf[0..4].copy_from_slice(b"RPLY");
        buf[0x04] = 3;
        buf[0x14..0x18].copy_from_slice(&180.0f32.to_le_bytes());
        buf[0x28..0x2C].copy_from_slice(&1_600_000_000u32.to_le_bytes());
        buf[0x2E] = 3;
        buf[0x2F] = 3;
        buf[0x30..0x34].copy_from_slice(&2u32.to_le_bytes()); // spy shot
        buf[0x34..0x38].copy_from_slice(&4u32.to_le_bytes()); // k4
        buf[0x38..0x3C].copy_from_slice(&0x5B12_1925u32.to_le_bytes()); // Ballroom
        buf[0x44] = 0b0000_0011;
        buf.extend_from_slice(b"abcxyz");
        buf
    }

    #[test]
    fn test_summarize() {
        let header = spyglass_header::decode(&header_bytes()).unwrap();
        let line = summarize(&header);
        assert!(line.starts_with("abc vs xyz on Ballroom, k4 "));
        assert!(line.contains("180s"));
        assert!(line.contains("completed [Bug, Contact]"));
    }

    #[test]
    fn test_execute_reports_failures_after_batch() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.replay");
        let bad = dir.path().join("bad.replay");
        std::fs::write(&good, header_bytes()).unwrap();
        std::fs::write(&bad, b"RPLY").unwrap();

        let err = execute(DecodeArgs {
            files: vec![good.clone(), bad],
            json: false,
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 files failed to decode");

        execute(DecodeArgs {
            files: vec![good],
            json: true,
        })
        .unwrap();
    }
}
