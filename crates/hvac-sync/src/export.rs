//! Spreadsheet output and reverse import of block values

use crate::mapping::FieldMapping;
use crate::record::{FieldId, FieldValue, RoomRecord};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Sheet name used when writing merged data
pub const MERGED_SHEET_NAME: &str = "Объединенные данные ОВИК";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write workbook: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("failed to create output directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Write records as a single-sheet workbook, one column per mapped field
pub fn save_rows(
    records: &[RoomRecord],
    path: &Path,
    columns: &FieldMapping,
    sheet_name: Option<&str>,
) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    if let Some(name) = sheet_name {
        sheet.set_name(name)?;
    }

    let columns: Vec<(FieldId, &str)> = columns.iter().collect();
    for (col, (_, header)) in columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, (field, _)) in columns.iter().enumerate() {
            match record.get(*field) {
                Some(FieldValue::Number(n)) => {
                    sheet.write_number(row, col as u16, n)?;
                }
                Some(FieldValue::Text(s)) if !s.is_empty() => {
                    sheet.write_string(row, col as u16, &s)?;
                }
                _ => {}
            }
        }
    }

    workbook.save(path)?;
    log::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

/// One field changed by reverse import
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub room_number: String,
    pub field: FieldId,
    pub old: Option<FieldValue>,
    pub new: FieldValue,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReverseImportReport {
    /// Rooms found in both the spreadsheet and the drawing
    pub updated_rooms: usize,
    pub changes: Vec<FieldChange>,
    /// Rooms with no matching block
    pub missing_rooms: Vec<String>,
}

/// Copy selected fields from block data into spreadsheet records.
///
/// Only non-empty block values that differ from the record are written.
pub fn apply_block_values(
    records: &mut [RoomRecord],
    blocks: &[RoomRecord],
    fields: &[FieldId],
) -> ReverseImportReport {
    let by_room: HashMap<&str, &RoomRecord> =
        blocks.iter().map(|b| (b.room_number(), b)).collect();

    let mut report = ReverseImportReport::default();

    for record in records.iter_mut() {
        let Some(block) = by_room.get(record.room_number()) else {
            log::warn!("Room {}: no block in drawing", record.room_number());
            report.missing_rooms.push(record.room_number().to_string());
            continue;
        };

        for &field in fields {
            let Some(new) = block.get(field).filter(FieldValue::is_provided) else {
                continue;
            };
            let old = record.get(field);
            if old.as_ref() == Some(&new) {
                continue;
            }

            log::debug!(
                "Room {}: {field} '{}' -> '{new}'",
                record.room_number(),
                old.as_ref().map(ToString::to_string).unwrap_or_default()
            );
            record.set(field, new.clone());
            report.changes.push(FieldChange {
                room_number: record.room_number().to_string(),
                field,
                old,
                new,
            });
        }

        report.updated_rooms += 1;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::mapping::Cell;

    fn room(number: &str) -> RoomRecord {
        RoomRecord::new(number).unwrap()
    }

    #[test]
    fn test_apply_block_values() {
        let mut records = vec![
            room("101")
                .with(FieldId::SupplySystem, "П1-1")
                .with(FieldId::Area, 25.5),
            room("102").with(FieldId::SupplySystem, "П1-2"),
            room("103"),
        ];
        let blocks = vec![
            room("101")
                .with(FieldId::SupplySystem, "П2-1")
                .with(FieldId::ExtractSystem, "В2-1")
                .with(FieldId::Area, "99 м²"),
            room("102")
                .with(FieldId::SupplySystem, "П1-2")
                .with(FieldId::ExtractSystem, ""),
        ];

        let report = apply_block_values(
            &mut records,
            &blocks,
            &[FieldId::SupplySystem, FieldId::ExtractSystem],
        );

        assert_eq!(report.updated_rooms, 2);
        assert_eq!(report.missing_rooms, vec!["103".to_string()]);
        assert_eq!(report.changes.len(), 2);
        assert_eq!(report.changes[0].old, Some(FieldValue::from("П1-1")));
        assert_eq!(report.changes[1].old, None);

        assert_eq!(records[0].text(FieldId::SupplySystem), Some("П2-1"));
        assert_eq!(records[0].text(FieldId::ExtractSystem), Some("В2-1"));
        // Not in the reverse field list
        assert_eq!(records[0].number(FieldId::Area), Some(25.5));
        assert!(!records[1].contains(FieldId::ExtractSystem));
    }

    #[test]
    fn test_save_rows_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("merged.xlsx");
        let columns = FieldMapping::new(
            [
                (FieldId::RoomNumber, "Номер помещения".to_string()),
                (FieldId::Area, "Площадь, м²".to_string()),
            ]
            .into_iter()
            .collect(),
        );

        save_rows(
            &[room("101").with(FieldId::Area, 25.5)],
            &path,
            &columns,
            Some(MERGED_SHEET_NAME),
        )
        .unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_save_rows_keeps_configured_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ordered.xlsx");
        let config: SyncConfig = serde_json::from_str(
            r#"{
                "excel_columns": {
                    "supply_system": "Приточная система",
                    "room_number": "Номер помещения",
                    "area": "Площадь, м²"
                },
                "block_attributes": { "room_number": "ROOM_NUM" }
            }"#,
        )
        .unwrap();

        save_rows(
            &[room("101").with(FieldId::Area, 25.5)],
            &path,
            &config.excel_mapping(),
            None,
        )
        .unwrap();

        let grid = crate::parser::load_grid(&path, None).unwrap();
        assert_eq!(
            crate::parser::header_names(&grid),
            vec!["Приточная система", "Номер помещения", "Площадь, м²"]
        );
        assert_eq!(grid[1][1], Cell::from("101"));
        assert_eq!(grid[1][2], Cell::Number(25.5));
    }
}
