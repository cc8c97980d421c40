//! Room data reading with automatic table-shape selection

use super::heat_loss::extract_heat_loss_rooms;
use super::workbook::{header_names, load_grid, rows_with_header, LoadError};
use crate::mapping::{detect_table_shape, Cell, FieldMapping, TableShape};
use crate::record::{FieldId, RoomRecord};
use std::path::Path;

/// Read room records from one sheet.
///
/// Standard tables go through the column mapping; heat-loss sheets through
/// the positional extractor. Rows without a room number are skipped.
pub fn read_room_data(
    path: &Path,
    sheet: Option<&str>,
    mapping: &FieldMapping,
) -> Result<Vec<RoomRecord>, LoadError> {
    let grid = load_grid(path, sheet)?;

    match detect_table_shape(&grid) {
        TableShape::HeatLoss => {
            log::info!("{}: heat-loss layout", path.display());
            Ok(extract_heat_loss_rooms(&grid))
        }
        TableShape::Standard => {
            log::info!("{}: standard layout", path.display());
            Ok(read_standard(&grid, mapping))
        }
    }
}

/// Detect the table shape of a sheet without parsing its rows
pub fn detect_file_shape(path: &Path, sheet: Option<&str>) -> Result<TableShape, LoadError> {
    let grid = load_grid(path, sheet)?;
    Ok(detect_table_shape(&grid))
}

fn read_standard(grid: &[Vec<Cell>], mapping: &FieldMapping) -> Vec<RoomRecord> {
    let rows = rows_with_header(grid);
    let total = rows.len();

    let records: Vec<RoomRecord> = rows.iter().filter_map(|row| mapping.resolve(row)).collect();

    if records.len() < total {
        log::warn!(
            "Skipped {} of {} rows without a room number",
            total - records.len(),
            total
        );
    }
    log::info!("Parsed {} rooms", records.len());
    records
}

/// Check that the header row carries the configured room number and room
/// name columns. Returns the missing column names.
pub fn validate_structure(
    path: &Path,
    sheet: Option<&str>,
    mapping: &FieldMapping,
) -> Result<Vec<String>, LoadError> {
    let grid = load_grid(path, sheet)?;
    let headers = header_names(&grid);

    let missing = [FieldId::RoomNumber, FieldId::RoomName]
        .into_iter()
        .filter_map(|f| mapping.external_name(f))
        .filter(|column| !headers.iter().any(|h| h == column))
        .map(str::to_string)
        .collect::<Vec<_>>();

    if !missing.is_empty() {
        log::warn!(
            "{}: missing columns {:?}, found {:?}",
            path.display(),
            missing,
            headers
        );
    }
    Ok(missing)
}
