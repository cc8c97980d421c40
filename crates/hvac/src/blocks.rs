use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::{presets, Table};
use hvac_sync::{BlockSync, CadConnector, DrawingFile, FieldId, SyncConfig};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct BlocksArgs {
    /// Drawing file to inspect
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub drawing: PathBuf,
}

pub fn execute(args: BlocksArgs, config: &SyncConfig) -> Result<()> {
    let mut drawing = DrawingFile::open(&args.drawing)
        .with_context(|| format!("Failed to open drawing: {}", args.drawing.display()))?;

    let template = config.default_template_block.to_uppercase();
    println!("{}", "Block definitions".bold());
    for name in drawing.available_blocks()? {
        let marker = if name.to_uppercase() == template {
            " (template)"
        } else {
            ""
        };
        println!("  {name}{marker}");
    }

    let sync = BlockSync::new(config, &mut drawing);
    let rooms = sync.read_blocks(&sync.room_entities()?);

    println!("{}", format!("Room blocks: {}", rooms.len()).bold());
    if rooms.is_empty() {
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.set_header(vec!["Room", "Name", "Supply", "Extract"]);
    for room in &rooms {
        let text = |field| room.text(field).unwrap_or("").to_string();
        table.add_row(vec![
            room.room_number().to_string(),
            text(FieldId::RoomName),
            text(FieldId::SupplySystem),
            text(FieldId::ExtractSystem),
        ]);
    }
    println!("{table}");
    Ok(())
}
