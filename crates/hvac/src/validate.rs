use crate::input::DataArgs;
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::{presets, Table};
use hvac_sync::{validate_sources, SyncConfig};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

pub fn execute(args: ValidateArgs, config: &SyncConfig) -> Result<()> {
    let specs = args.data.specs()?;
    let results = validate_sources(&specs, &config.excel_mapping());

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.set_header(vec!["Source", "Result"]);

    let mut invalid = 0;
    for (name, result) in &results {
        let text = match result {
            Ok(()) => "ok".green().to_string(),
            Err(reason) => {
                invalid += 1;
                reason.red().to_string()
            }
        };
        table.add_row(vec![name.clone(), text]);
    }
    println!("{table}");

    if invalid > 0 {
        bail!("{invalid} of {} sources are invalid", results.len());
    }
    Ok(())
}
