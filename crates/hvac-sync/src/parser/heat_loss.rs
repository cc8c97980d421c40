//! Positional extractor for heat-loss calculation sheets
//!
//! These sheets have no usable header row. Room data starts at spreadsheet
//! row 20; column A holds the room number, column B the room name and
//! column S the heat loss in watts.

use crate::mapping::Cell;
use crate::record::{FieldId, RoomRecord};

/// Zero-based index of the first data row (spreadsheet row 20)
pub const FIRST_DATA_ROW: usize = 19;
pub const ROOM_NUMBER_COLUMN: usize = 0;
pub const ROOM_NAME_COLUMN: usize = 1;
/// Column S
pub const HEAT_LOSS_COLUMN: usize = 18;
/// Design temperature assumed for rooms from a heat-loss sheet
pub const DEFAULT_TEMPERATURE: f64 = 20.0;

/// Extract room records from an absolute cell grid
pub fn extract_heat_loss_rooms(grid: &[Vec<Cell>]) -> Vec<RoomRecord> {
    let mut rooms = Vec::new();

    for (index, row) in grid.iter().enumerate().skip(FIRST_DATA_ROW) {
        let cell = |col: usize| row.get(col).cloned().unwrap_or_default();

        let number = cell(ROOM_NUMBER_COLUMN).to_text();
        let name = cell(ROOM_NAME_COLUMN).to_text();
        if name.is_empty() {
            continue;
        }
        let Some(record) = RoomRecord::new(&number) else {
            continue;
        };

        let heat_loss = cell(HEAT_LOSS_COLUMN).to_number().unwrap_or(0.0);
        log::trace!("Row {}: room {number} heat loss {heat_loss}", index + 1);

        rooms.push(
            record
                .with(FieldId::RoomName, name)
                .with(FieldId::HeatLoss, heat_loss)
                .with(FieldId::Temperature, DEFAULT_TEMPERATURE),
        );
    }

    log::info!("Extracted {} rooms from heat-loss sheet", rooms.len());
    rooms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_row(number: Cell, name: &str, heat_loss: Cell) -> Vec<Cell> {
        let mut row = vec![Cell::Empty; HEAT_LOSS_COLUMN + 1];
        row[ROOM_NUMBER_COLUMN] = number;
        row[ROOM_NAME_COLUMN] = Cell::from(name);
        row[HEAT_LOSS_COLUMN] = heat_loss;
        row
    }

    #[test]
    fn test_extracts_from_fixed_positions() {
        let mut grid: Vec<Vec<Cell>> = vec![vec![Cell::from("Расчет теплопотерь")]];
        grid.resize(FIRST_DATA_ROW, Vec::new());
        grid.push(data_row(Cell::Number(101.0), "Офис", Cell::Number(1200.0)));
        grid.push(data_row(Cell::from("102"), "Коридор", Cell::from("—")));
        grid.push(data_row(Cell::Empty, "Итого", Cell::Number(5000.0)));
        grid.push(data_row(Cell::from("104"), "", Cell::Number(10.0)));
        grid.push(vec![Cell::from("105"), Cell::from("Склад")]);

        let rooms = extract_heat_loss_rooms(&grid);
        assert_eq!(rooms.len(), 3);

        assert_eq!(rooms[0].room_number(), "101");
        assert_eq!(rooms[0].text(FieldId::RoomName), Some("Офис"));
        assert_eq!(rooms[0].number(FieldId::HeatLoss), Some(1200.0));
        assert_eq!(rooms[0].number(FieldId::Temperature), Some(DEFAULT_TEMPERATURE));

        assert_eq!(rooms[1].number(FieldId::HeatLoss), Some(0.0));
        assert_eq!(rooms[2].room_number(), "105");
        assert_eq!(rooms[2].number(FieldId::HeatLoss), Some(0.0));
    }

    #[test]
    fn test_rows_above_offset_ignored() {
        let grid = vec![data_row(Cell::from("1"), "Офис", Cell::Number(1.0)); FIRST_DATA_ROW];
        assert!(extract_heat_loss_rooms(&grid).is_empty());
    }
}
