// crates/cli/src/main.rs
//! compaction-recall binary.
//!
//! Reads a session snapshot (JSON, file or stdin), then renders the transcript,
//! builds the post-compaction tail, or manages the transcript directory.

mod cli;
mod commands;
mod logging;

use anyhow::{Context as _, Result};
use clap::Parser;
use compaction_recall_core::RecallConfig;

use cli::Cli;
use commands::Context;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => RecallConfig::load_from_path(path),
        None => RecallConfig::load(),
    }
    .context("loading configuration")?;

    let ctx = Context::new(config, cli.transcript_dir);
    let output = commands::execute(cli.command, &ctx).await?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
