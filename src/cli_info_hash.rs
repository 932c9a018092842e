use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use red_trul::cli_style::get_styles;
use red_trul::torrent::info_hash;

/// Print the info hash of a .torrent file.
#[derive(Parser, Debug)]
#[command(styles = get_styles(), version)]
struct CliArgs {
    /// Path to the .torrent file.
    pub torrent: PathBuf,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let bytes = std::fs::read(&args.torrent)
        .with_context(|| format!("Failed to read torrent file: {:?}", args.torrent))?;
    let hash = info_hash(&bytes).with_context(|| format!("Invalid torrent: {:?}", args.torrent))?;
    println!("{}", hash);
    Ok(())
}
