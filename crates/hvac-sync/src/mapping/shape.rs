//! Table-shape detection

use super::resolver::Cell;

/// How many leading rows are scanned
pub const SCAN_ROWS: usize = 25;

/// Marker phrase of the specialised heat-loss sheet
const HEAT_LOSS_MARKERS: &[&str] = &["теплопотерь"];

/// Header synonyms of a conventional room table
const STANDARD_HEADERS: &[&str] = &[
    "номер помещения",
    "наименование",
    "площадь",
    "номер",
    "название",
];

/// Layout of a room spreadsheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableShape {
    /// Header row with recognisable column names, data right below
    #[default]
    Standard,
    /// Heat-loss calculation sheet: no header, data pinned to fixed positions
    HeatLoss,
}

impl TableShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableShape::Standard => "standard",
            TableShape::HeatLoss => "heat_loss",
        }
    }
}

/// Classify a sheet from its leading rows.
///
/// A heat-loss marker anywhere in the scanned cells wins outright; otherwise
/// the sheet is standard (header synonyms only confirm it).
pub fn detect_table_shape(rows: &[Vec<Cell>]) -> TableShape {
    let texts: Vec<String> = rows
        .iter()
        .take(SCAN_ROWS)
        .flatten()
        .filter(|c| !c.is_empty())
        .map(|c| c.to_text().to_lowercase())
        .collect();

    if texts
        .iter()
        .any(|t| HEAT_LOSS_MARKERS.iter().any(|m| t.contains(m)))
    {
        log::debug!("Heat-loss marker found, using positional layout");
        return TableShape::HeatLoss;
    }

    if texts
        .iter()
        .any(|t| STANDARD_HEADERS.iter().any(|h| t.contains(h)))
    {
        log::debug!("Standard headers found");
    } else {
        log::debug!("Table shape not recognised, assuming standard");
    }
    TableShape::Standard
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<Cell>> {
        rows.iter()
            .map(|r| r.iter().map(|c| Cell::from(*c)).collect())
            .collect()
    }

    #[test]
    fn test_standard_headers() {
        let rows = grid(&[
            &["Номер помещения", "Наименование", "Площадь, м²"],
            &["101", "Офис", "25"],
        ]);
        assert_eq!(detect_table_shape(&rows), TableShape::Standard);
    }

    #[test]
    fn test_heat_loss_marker() {
        let rows = grid(&[
            &["", "Объект: корпус 2"],
            &["РАСЧЕТ ТЕПЛОПОТЕРЬ ПОМЕЩЕНИЙ"],
            &["Номер", "Наименование"],
        ]);
        assert_eq!(detect_table_shape(&rows), TableShape::HeatLoss);
    }

    #[test]
    fn test_marker_beats_earlier_headers() {
        let rows = grid(&[&["Номер помещения"], &["", "", "Сводка теплопотерь"]]);
        assert_eq!(detect_table_shape(&rows), TableShape::HeatLoss);
    }

    #[test]
    fn test_marker_past_scan_window_ignored() {
        let mut rows: Vec<Vec<Cell>> = (0..SCAN_ROWS).map(|_| vec![Cell::Empty]).collect();
        rows.push(vec![Cell::from("теплопотерь")]);
        assert_eq!(detect_table_shape(&rows), TableShape::Standard);
    }

    #[test]
    fn test_unknown_defaults_to_standard() {
        assert_eq!(detect_table_shape(&[]), TableShape::Standard);
        let rows = grid(&[&["foo", "bar"]]);
        assert_eq!(detect_table_shape(&rows), TableShape::Standard);
    }

    #[test]
    fn test_heat_loss_column_header_is_not_marker() {
        // "Теплопотери" (plural nominative) is a normal column header
        let rows = grid(&[&["Номер помещения", "Теплопотери, Вт"]]);
        assert_eq!(detect_table_shape(&rows), TableShape::Standard);
    }
}
