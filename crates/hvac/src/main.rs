use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hvac_sync::SyncConfig;
use std::path::{Path, PathBuf};

mod blocks;
mod create;
mod detect;
mod import;
mod input;
mod merge;
mod update;
mod validate;

#[derive(Parser, Debug)]
#[command(name = "hvac", version, long_about = None)]
#[command(about = "Transfer HVAC room data between spreadsheets and drawing blocks")]
struct Cli {
    /// Block mapping configuration
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        default_value = "config/block_mapping.json"
    )]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge room data from one or more spreadsheets
    Merge(merge::MergeArgs),

    /// Show the detected table layout of a spreadsheet
    Detect(detect::DetectArgs),

    /// Check that spreadsheets have the required columns
    Validate(validate::ValidateArgs),

    /// Write room data into existing room blocks
    Update(update::UpdateArgs),

    /// Create room blocks from a template
    Create(create::CreateArgs),

    /// Read block values back into a spreadsheet
    Import(import::ImportArgs),

    /// List block definitions and room blocks of a drawing
    Blocks(blocks::BlocksArgs),
}

fn load_config(path: &Path) -> Result<SyncConfig> {
    log::debug!("Using configuration {}", path.display());
    SyncConfig::load(path)
        .with_context(|| format!("Failed to load configuration: {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Detect(args) => detect::execute(args),
        Commands::Merge(args) => merge::execute(args, &load_config(&cli.config)?),
        Commands::Validate(args) => validate::execute(args, &load_config(&cli.config)?),
        Commands::Update(args) => update::execute(args, &load_config(&cli.config)?),
        Commands::Create(args) => create::execute(args, &load_config(&cli.config)?),
        Commands::Import(args) => import::execute(args, &load_config(&cli.config)?),
        Commands::Blocks(args) => blocks::execute(args, &load_config(&cli.config)?),
    }
}
