use crate::input::DataArgs;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use hvac_sync::{BlockSync, DrawingFile, PlainFormatter, SyncConfig};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Drawing file to update
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub drawing: PathBuf,

    #[command(flatten)]
    pub data: DataArgs,

    /// Write raw values without units or abbreviations
    #[arg(long)]
    pub plain: bool,
}

pub fn execute(args: UpdateArgs, config: &SyncConfig) -> Result<()> {
    let outcome = args.data.load(config)?;

    let mut drawing = DrawingFile::open(&args.drawing)
        .with_context(|| format!("Failed to open drawing: {}", args.drawing.display()))?;

    let mut sync = BlockSync::new(config, &mut drawing);
    if args.plain {
        sync = sync.with_formatter(PlainFormatter);
    }
    let stats = sync.update_all(&outcome.records)?;

    eprintln!(
        "{} updated, {} unchanged, {} without data",
        stats.updated.to_string().green(),
        stats.unchanged,
        stats.not_found
    );
    if stats.errors > 0 {
        eprintln!("{}", format!("{} blocks failed", stats.errors).red());
    }
    Ok(())
}
