use crate::input::DataArgs;
use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use hvac_sync::placement::{extract_coordinates, has_coordinates};
use hvac_sync::{BlockSync, CadConnector, DrawingFile, RoomRecord, SyncConfig};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Drawing file to add blocks to
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub drawing: PathBuf,

    #[command(flatten)]
    pub data: DataArgs,

    /// Template block (defaults to `default_template_block`)
    #[arg(long, value_name = "BLOCK")]
    pub template: Option<String>,

    /// Grid origin
    #[arg(long, value_name = "X,Y", value_parser = parse_pair)]
    pub start: Option<(f64, f64)>,

    /// Grid spacing
    #[arg(long, value_name = "DX,DY", value_parser = parse_pair)]
    pub spacing: Option<(f64, f64)>,

    /// Place blocks at the records' X/Y columns instead of on a grid
    #[arg(long, conflicts_with_all = ["start", "spacing"])]
    pub use_coordinates: bool,
}

fn parse_pair(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected two comma-separated numbers, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", v.trim()))
    };
    Ok((parse(x)?, parse(y)?))
}

pub fn execute(args: CreateArgs, config: &SyncConfig) -> Result<()> {
    let outcome = args.data.load(config)?;
    let template = args
        .template
        .unwrap_or_else(|| config.default_template_block.clone());

    let mut drawing = DrawingFile::open(&args.drawing)
        .with_context(|| format!("Failed to open drawing: {}", args.drawing.display()))?;

    if !drawing.block_exists(&template)? {
        bail!(
            "Template block '{template}' not found; available: {}",
            drawing.available_blocks()?.join(", ")
        );
    }

    let mut sync = BlockSync::new(config, &mut drawing);
    let stats = if args.use_coordinates {
        if !has_coordinates(&outcome.records) {
            bail!("Room records carry no coordinates");
        }
        let (records, points): (Vec<RoomRecord>, Vec<_>) = outcome
            .records
            .iter()
            .zip(extract_coordinates(&outcome.records))
            .filter_map(|(record, point)| Some((record.clone(), point?)))
            .unzip();
        let skipped = outcome.records.len() - records.len();
        if skipped > 0 {
            eprintln!("{} rooms without coordinates skipped", skipped);
        }
        sync.create_at(&records, &template, &points)
    } else {
        sync.create_on_grid(&outcome.records, &template, args.start, args.spacing)
    };

    eprintln!("{} blocks created", stats.created.to_string().green());
    if stats.errors > 0 {
        eprintln!("{}", format!("{} blocks failed", stats.errors).red());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair() {
        assert_eq!(parse_pair("10,-20.5"), Ok((10.0, -20.5)));
        assert_eq!(parse_pair(" 1 , 2 "), Ok((1.0, 2.0)));
        assert!(parse_pair("10").is_err());
        assert!(parse_pair("a,2").is_err());
    }
}
