//! Config command - show the effective configuration

use anyhow::{Context, Result};
use clap::Args;
use spyglass_core::config;

/// Arguments for the config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Write the effective configuration back to disk (creates the file with defaults)
    #[arg(long)]
    pub save: bool,
}

/// Execute the config command
pub fn execute(args: ConfigArgs) -> Result<()> {
    let config = config::load();

    match config::config_path() {
        Some(path) if path.exists() => println!("# {}", path.display()),
        Some(path) => println!("# {} (not found, using defaults)", path.display()),
        None => println!("# no config directory on this platform, using defaults"),
    }
    print!(
        "{}",
        toml::to_string_pretty(&config).context("failed to serialize config")?
    );

    if args.save {
        if let Some(path) = config::save(&config)? {
            tracing::info!("saved {}", path.display());
        }
    }
    Ok(())
}
