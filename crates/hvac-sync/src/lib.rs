//! HVAC room data synchronisation
//!
//! Reads room parameters (area, airflow, heat loss, systems) from one or more
//! spreadsheets, merges them per room number by source priority, and writes
//! them into the attributed room blocks of a drawing. Block values can be read
//! back and merged into a spreadsheet.

pub mod cad;
pub mod config;
pub mod export;
pub mod mapping;
pub mod merge;
pub mod parser;
pub mod placement;
pub mod record;

pub use cad::{BlockSync, CadConnector, CadError, CreateStats, DrawingFile, UpdateStats};
pub use config::{load_sources_file, ConfigError, SyncConfig};
pub use export::{apply_block_values, save_rows, ExportError, ReverseImportReport};
pub use mapping::{AttributeFormatter, FieldMapping, PlainFormatter, TableShape, UnitFormatter};
pub use merge::{
    load_sources, merge_from_specs, merge_sources, AllowedFields, MergeOutcome, SourceDescriptor,
    SourceSpec, SourceStats,
};
pub use parser::{read_room_data, validate_structure, LoadError};
pub use record::{FieldId, FieldValue, RoomRecord};

use crate::parser::normalize_file_path;

/// Check every declared source before a multi-source run.
///
/// A source is valid when it names a file that loads and whose header row
/// has the configured room number and room name columns.
pub fn validate_sources(
    specs: &[SourceSpec],
    mapping: &FieldMapping,
) -> Vec<(String, Result<(), String>)> {
    specs
        .iter()
        .map(|spec| {
            let result = match &spec.file_path {
                None => Err("no file path".to_string()),
                Some(file_path) => {
                    let path = normalize_file_path(&file_path.to_string_lossy());
                    match validate_structure(&path, spec.sheet_name.as_deref(), mapping) {
                        Ok(missing) if missing.is_empty() => Ok(()),
                        Ok(missing) => Err(format!("missing columns: {}", missing.join(", "))),
                        Err(e) => Err(e.to_string()),
                    }
                }
            };
            if let Err(reason) = &result {
                log::warn!("Source '{}' is invalid: {reason}", spec.name);
            }
            (spec.name.clone(), result)
        })
        .collect()
}
