//! Field mapping resolver: external column names → room records

use crate::record::{FieldId, FieldValue, RoomRecord};
use indexmap::IndexMap;
use std::collections::HashMap;

/// A raw spreadsheet cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed text form; integral numbers drop the fractional part
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => format!("{n}"),
            Cell::Bool(b) => b.to_string(),
        }
    }

    /// Lenient numeric form: anything unparseable is `None`
    pub fn to_number(&self) -> Option<f64> {
        let n = match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().replace(',', ".").parse().ok()?,
            Cell::Bool(_) | Cell::Empty => return None,
        };
        n.is_finite().then_some(n)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// One spreadsheet row keyed by external column name
pub type RawRow = HashMap<String, Cell>;

/// Correspondence between field ids and their external names for one side
/// (spreadsheet headers or block attribute tags).
///
/// A field without an external name is simply unavailable for that side.
/// Iteration follows the order the names were configured in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMapping {
    names: IndexMap<FieldId, String>,
}

impl FieldMapping {
    pub fn new(names: IndexMap<FieldId, String>) -> Self {
        Self { names }
    }

    pub fn external_name(&self, field: FieldId) -> Option<&str> {
        self.names.get(&field).map(String::as_str)
    }

    /// Reverse lookup, ignoring case and surrounding whitespace
    pub fn field_for(&self, external: &str) -> Option<FieldId> {
        let external = external.trim().to_lowercase();
        self.names
            .iter()
            .find(|(_, name)| name.trim().to_lowercase() == external)
            .map(|(field, _)| *field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &str)> {
        self.names.iter().map(|(f, n)| (*f, n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Build a record from a raw row.
    ///
    /// Numeric fields coerce to `f64` (blank or unparseable → 0.0), all other
    /// fields to trimmed text. Returns `None` when the room number is empty;
    /// callers skip such rows.
    pub fn resolve(&self, raw: &RawRow) -> Option<RoomRecord> {
        let room_column = self.external_name(FieldId::RoomNumber)?;
        let room_number = raw.get(room_column).map(Cell::to_text).unwrap_or_default();
        let mut record = RoomRecord::new(&room_number)?;

        for (field, column) in self.iter() {
            if field == FieldId::RoomNumber {
                continue;
            }
            let Some(cell) = raw.get(column) else {
                continue;
            };
            record.set(field, coerce(field, cell));
        }

        Some(record)
    }
}

fn coerce(field: FieldId, cell: &Cell) -> FieldValue {
    if field.is_numeric() {
        FieldValue::Number(cell.to_number().unwrap_or(0.0))
    } else {
        FieldValue::Text(cell.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> FieldMapping {
        FieldMapping::new(IndexMap::from([
            (FieldId::RoomNumber, "Номер помещения".to_string()),
            (FieldId::RoomName, "Наименование".to_string()),
            (FieldId::Area, "Площадь, м²".to_string()),
            (FieldId::HeatLoss, "Теплопотери, Вт".to_string()),
            (FieldId::SupplySystem, "Приточная система".to_string()),
        ]))
    }

    fn row(cells: &[(&str, Cell)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_resolve_typed_fields() {
        let raw = row(&[
            ("Номер помещения", Cell::Number(101.0)),
            ("Наименование", Cell::from("  Офис  ")),
            ("Площадь, м²", Cell::Number(25.5)),
            ("Теплопотери, Вт", Cell::from("1200")),
            ("Приточная система", Cell::from("П1-1")),
            ("Лишняя колонка", Cell::from("x")),
        ]);

        let rec = mapping().resolve(&raw).unwrap();
        assert_eq!(rec.room_number(), "101");
        assert_eq!(rec.text(FieldId::RoomName), Some("Офис"));
        assert_eq!(rec.number(FieldId::Area), Some(25.5));
        assert_eq!(rec.number(FieldId::HeatLoss), Some(1200.0));
        assert_eq!(rec.text(FieldId::SupplySystem), Some("П1-1"));
        assert_eq!(rec.len(), 4);
    }

    #[test]
    fn test_missing_column_leaves_field_absent() {
        let raw = row(&[("Номер помещения", Cell::from("A-12"))]);
        let rec = mapping().resolve(&raw).unwrap();
        assert_eq!(rec.room_number(), "A-12");
        assert!(!rec.contains(FieldId::Area));
    }

    #[test]
    fn test_blank_and_garbage_numbers_default_to_zero() {
        let raw = row(&[
            ("Номер помещения", Cell::from("7")),
            ("Площадь, м²", Cell::Empty),
            ("Теплопотери, Вт", Cell::from("n/a")),
            ("Наименование", Cell::Empty),
        ]);
        let rec = mapping().resolve(&raw).unwrap();
        assert_eq!(rec.number(FieldId::Area), Some(0.0));
        assert_eq!(rec.number(FieldId::HeatLoss), Some(0.0));
        assert_eq!(rec.text(FieldId::RoomName), Some(""));
    }

    #[test]
    fn test_decimal_comma() {
        let raw = row(&[
            ("Номер помещения", Cell::from("7")),
            ("Площадь, м²", Cell::from("25,5")),
        ]);
        let rec = mapping().resolve(&raw).unwrap();
        assert_eq!(rec.number(FieldId::Area), Some(25.5));
    }

    #[test]
    fn test_empty_room_number_is_absent() {
        let raw = row(&[
            ("Номер помещения", Cell::from("   ")),
            ("Площадь, м²", Cell::Number(10.0)),
        ]);
        assert!(mapping().resolve(&raw).is_none());

        let raw = row(&[("Площадь, м²", Cell::Number(10.0))]);
        assert!(mapping().resolve(&raw).is_none());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let raw = row(&[
            ("Номер помещения", Cell::from("101")),
            ("Площадь, м²", Cell::from("abc")),
            ("Наименование", Cell::from("Серверная")),
        ]);
        let m = mapping();
        assert_eq!(m.resolve(&raw), m.resolve(&raw));
    }

    #[test]
    fn test_reverse_lookup_ignores_case() {
        let m = FieldMapping::new(IndexMap::from([
            (FieldId::RoomNumber, "ROOM_NUM".to_string()),
            (FieldId::RoomName, "Наименование".to_string()),
        ]));
        assert_eq!(m.field_for("room_num"), Some(FieldId::RoomNumber));
        assert_eq!(m.field_for("НАИМЕНОВАНИЕ"), Some(FieldId::RoomName));
        assert_eq!(m.field_for("AREA"), None);
    }
}
