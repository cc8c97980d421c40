use anyhow::{Context, Result};
use clap::Args;
use hvac_sync::parser::{detect_file_shape, normalize_file_path};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Spreadsheet to inspect
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Sheet to inspect (defaults to the first sheet)
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,
}

pub fn execute(args: DetectArgs) -> Result<()> {
    let path = normalize_file_path(&args.file.to_string_lossy());
    let shape = detect_file_shape(&path, args.sheet.as_deref())
        .with_context(|| format!("Failed to read {}", path.display()))?;

    println!("{}", shape.as_str());
    Ok(())
}
