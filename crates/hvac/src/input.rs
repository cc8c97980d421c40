//! Room data input shared by the data commands

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::{presets, Cell, CellAlignment, Table};
use hvac_sync::parser::normalize_file_path;
use hvac_sync::{
    load_sources_file, merge_from_specs, merge_sources, read_room_data, MergeOutcome,
    SourceDescriptor, SourceSpec, SyncConfig,
};
use std::path::PathBuf;

/// Where room records come from
#[derive(Args, Debug)]
pub struct DataArgs {
    /// Spreadsheet with room data
    #[arg(
        long,
        value_name = "FILE",
        value_hint = clap::ValueHint::FilePath,
        required_unless_present = "sources",
        conflicts_with = "sources"
    )]
    pub excel: Option<PathBuf>,

    /// Sheet to read (defaults to the first sheet)
    #[arg(long, value_name = "NAME", requires = "excel")]
    pub sheet: Option<String>,

    /// TOML file with prioritised `[[source]]` entries
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub sources: Option<PathBuf>,
}

impl DataArgs {
    /// Declared sources; a single `--excel` file becomes one source with all fields
    pub fn specs(&self) -> Result<Vec<SourceSpec>> {
        match (&self.excel, &self.sources) {
            (_, Some(sources)) => load_sources_file(sources)
                .with_context(|| format!("Failed to load sources: {}", sources.display())),
            (Some(excel), None) => Ok(vec![SourceSpec {
                name: source_name(excel),
                file_path: Some(excel.clone()),
                sheet_name: self.sheet.clone(),
                fields: Vec::new(),
                priority: 0,
            }]),
            (None, None) => bail!("Either --excel or --sources is required"),
        }
    }

    /// Read and merge room records.
    ///
    /// A single spreadsheet that fails to load is fatal; in a multi-source
    /// run failed sources are reported and skipped. No records at all is an
    /// error either way.
    pub fn load(&self, config: &SyncConfig) -> Result<MergeOutcome> {
        let mapping = config.excel_mapping();

        let outcome = match (&self.excel, &self.sources) {
            (Some(excel), None) => {
                let path = normalize_file_path(&excel.to_string_lossy());
                let records = read_room_data(&path, self.sheet.as_deref(), &mapping)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                merge_sources(&[SourceDescriptor::new(source_name(excel), records)])
            }
            _ => {
                let specs = self.specs()?;
                if specs.is_empty() {
                    bail!("No sources declared");
                }
                let outcome = merge_from_specs(&specs, &mapping);
                print_source_stats(&outcome);
                outcome
            }
        };

        if outcome.is_empty() {
            bail!("No room records found");
        }
        eprintln!("Loaded {} rooms", outcome.records.len());
        Ok(outcome)
    }
}

fn source_name(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_source_stats(outcome: &MergeOutcome) {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.set_header(vec!["Source", "Rooms", "Fields set", "Status"]);

    for stats in &outcome.stats {
        let status = if stats.failed {
            "failed".red().to_string()
        } else {
            "ok".green().to_string()
        };
        table.add_row(vec![
            Cell::new(&stats.name),
            Cell::new(stats.rooms).set_alignment(CellAlignment::Right),
            Cell::new(stats.fields_added).set_alignment(CellAlignment::Right),
            Cell::new(status),
        ]);
    }

    eprintln!("{table}");
}
