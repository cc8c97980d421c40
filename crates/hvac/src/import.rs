//! Reverse import: block attribute values back into the spreadsheet

use crate::input::DataArgs;
use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::{presets, Table};
use hvac_sync::export::MERGED_SHEET_NAME;
use hvac_sync::{apply_block_values, save_rows, BlockSync, DrawingFile, SyncConfig};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Drawing file to read blocks from
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub drawing: PathBuf,

    #[command(flatten)]
    pub data: DataArgs,

    /// Output workbook
    #[arg(short, long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,
}

pub fn execute(args: ImportArgs, config: &SyncConfig) -> Result<()> {
    let mut records = args.data.load(config)?.records;

    let mut drawing = DrawingFile::open(&args.drawing)
        .with_context(|| format!("Failed to open drawing: {}", args.drawing.display()))?;
    let sync = BlockSync::new(config, &mut drawing);
    let entities = sync.room_entities()?;
    let blocks = sync.read_blocks(&entities);
    if blocks.is_empty() {
        bail!("No room blocks found in {}", args.drawing.display());
    }

    let report = apply_block_values(&mut records, &blocks, &config.reverse_import_fields);

    if !report.changes.is_empty() {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_header(vec!["Room", "Field", "Old", "New"]);
        for change in &report.changes {
            table.add_row(vec![
                change.room_number.clone(),
                change.field.to_string(),
                change.old.as_ref().map(ToString::to_string).unwrap_or_default(),
                change.new.to_string(),
            ]);
        }
        println!("{table}");
    }
    if !report.missing_rooms.is_empty() {
        eprintln!(
            "{}",
            format!("No block for rooms: {}", report.missing_rooms.join(", ")).yellow()
        );
    }

    save_rows(
        &records,
        &args.output,
        &config.excel_mapping(),
        Some(MERGED_SHEET_NAME),
    )
    .with_context(|| format!("Failed to write {}", args.output.display()))?;

    eprintln!(
        "{} rooms matched, {} fields changed; wrote {}",
        report.updated_rooms,
        report.changes.len().to_string().green(),
        args.output.display()
    );
    Ok(())
}
