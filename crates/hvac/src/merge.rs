use crate::input::DataArgs;
use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{presets, Cell, CellAlignment, Table};
use hvac_sync::export::MERGED_SHEET_NAME;
use hvac_sync::{save_rows, FieldId, RoomRecord, SyncConfig};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct MergeArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Write the merged records to this workbook
    #[arg(short, long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Print the merged records
    #[arg(long)]
    pub show: bool,
}

pub fn execute(args: MergeArgs, config: &SyncConfig) -> Result<()> {
    let outcome = args.data.load(config)?;

    if args.show {
        print_records(&outcome.records);
    }

    if let Some(output) = &args.output {
        save_rows(
            &outcome.records,
            output,
            &config.excel_mapping(),
            Some(MERGED_SHEET_NAME),
        )
        .with_context(|| format!("Failed to write {}", output.display()))?;
        eprintln!("Wrote {}", output.display());
    }

    Ok(())
}

fn print_records(records: &[RoomRecord]) {
    const COLUMNS: [FieldId; 6] = [
        FieldId::RoomNumber,
        FieldId::RoomName,
        FieldId::Area,
        FieldId::HeatLoss,
        FieldId::SupplySystem,
        FieldId::ExtractSystem,
    ];

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.set_header(COLUMNS.iter().map(FieldId::as_str));

    for record in records {
        table.add_row(COLUMNS.iter().map(|&field| {
            let text = record.get(field).map(|v| v.to_string()).unwrap_or_default();
            let cell = Cell::new(text);
            if field.is_numeric() {
                cell.set_alignment(CellAlignment::Right)
            } else {
                cell
            }
        }));
    }

    println!("{table}");
}
