//! Room records and the fixed field vocabulary

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Semantic field identifier shared by spreadsheets and CAD blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    RoomNumber,
    RoomName,
    Area,
    AirSupply,
    AirExtract,
    HeatLoss,
    Temperature,
    SupplySystem,
    ExtractSystem,
    CleanlinessClass,
    CoordinateX,
    CoordinateY,
}

impl FieldId {
    /// Every known field, in column order
    pub const ALL: [FieldId; 12] = [
        FieldId::RoomNumber,
        FieldId::RoomName,
        FieldId::Area,
        FieldId::AirSupply,
        FieldId::AirExtract,
        FieldId::HeatLoss,
        FieldId::Temperature,
        FieldId::SupplySystem,
        FieldId::ExtractSystem,
        FieldId::CleanlinessClass,
        FieldId::CoordinateX,
        FieldId::CoordinateY,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::RoomNumber => "room_number",
            FieldId::RoomName => "room_name",
            FieldId::Area => "area",
            FieldId::AirSupply => "air_supply",
            FieldId::AirExtract => "air_extract",
            FieldId::HeatLoss => "heat_loss",
            FieldId::Temperature => "temperature",
            FieldId::SupplySystem => "supply_system",
            FieldId::ExtractSystem => "extract_system",
            FieldId::CleanlinessClass => "cleanliness_class",
            FieldId::CoordinateX => "coordinate_x",
            FieldId::CoordinateY => "coordinate_y",
        }
    }

    /// Fields parsed as floating point when read from a spreadsheet
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldId::Area
                | FieldId::AirSupply
                | FieldId::AirExtract
                | FieldId::HeatLoss
                | FieldId::Temperature
                | FieldId::CoordinateX
                | FieldId::CoordinateY
        )
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldId::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s.trim())
            .ok_or_else(|| format!("unknown field '{s}'"))
    }
}

/// A single field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Whether the value counts as supplied data.
    ///
    /// Empty text and zero are the "not provided" sentinels.
    pub fn is_provided(&self) -> bool {
        match self {
            FieldValue::Number(n) => *n != 0.0,
            FieldValue::Text(s) => !s.is_empty(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().replace(',', ".").parse().ok(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Per-room data keyed by field identifier
///
/// Always carries a non-empty room number, which is the natural key used to
/// match spreadsheet rows, merge sources and CAD blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomRecord {
    room_number: String,
    fields: BTreeMap<FieldId, FieldValue>,
}

impl RoomRecord {
    /// Create a record, or `None` when the trimmed room number is empty
    pub fn new(room_number: impl AsRef<str>) -> Option<Self> {
        let room_number = room_number.as_ref().trim();
        if room_number.is_empty() {
            return None;
        }
        Some(Self {
            room_number: room_number.to_string(),
            fields: BTreeMap::new(),
        })
    }

    /// A copy carrying only the room number
    pub fn key_only(&self) -> Self {
        Self {
            room_number: self.room_number.clone(),
            fields: BTreeMap::new(),
        }
    }

    pub fn room_number(&self) -> &str {
        &self.room_number
    }

    /// Look up a field; `RoomNumber` is answered from the key
    pub fn get(&self, field: FieldId) -> Option<FieldValue> {
        if field == FieldId::RoomNumber {
            return Some(FieldValue::Text(self.room_number.clone()));
        }
        self.fields.get(&field).cloned()
    }

    pub fn contains(&self, field: FieldId) -> bool {
        field == FieldId::RoomNumber || self.fields.contains_key(&field)
    }

    /// Set a field value. Setting `RoomNumber` is ignored; the key is fixed.
    pub fn set(&mut self, field: FieldId, value: impl Into<FieldValue>) {
        if field == FieldId::RoomNumber {
            return;
        }
        self.fields.insert(field, value.into());
    }

    pub fn with(mut self, field: FieldId, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn number(&self, field: FieldId) -> Option<f64> {
        self.fields.get(&field).and_then(FieldValue::as_number)
    }

    pub fn text(&self, field: FieldId) -> Option<&str> {
        if field == FieldId::RoomNumber {
            return Some(&self.room_number);
        }
        self.fields.get(&field).and_then(FieldValue::as_text)
    }

    /// Iterate over non-key fields in vocabulary order
    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_room_number_rejected() {
        assert!(RoomRecord::new("").is_none());
        assert!(RoomRecord::new("   ").is_none());
        assert_eq!(RoomRecord::new(" 101 ").unwrap().room_number(), "101");
    }

    #[test]
    fn test_room_number_is_not_a_field() {
        let mut rec = RoomRecord::new("101").unwrap();
        rec.set(FieldId::RoomNumber, "999");
        assert_eq!(rec.room_number(), "101");
        assert!(rec.is_empty());
        assert_eq!(rec.get(FieldId::RoomNumber), Some(FieldValue::from("101")));
    }

    #[test]
    fn test_provided_sentinels() {
        assert!(!FieldValue::Number(0.0).is_provided());
        assert!(!FieldValue::Text(String::new()).is_provided());
        assert!(FieldValue::Text("0".into()).is_provided());
        assert!(FieldValue::Number(-1.5).is_provided());
    }

    #[test]
    fn test_field_id_parse() {
        assert_eq!("heat_loss".parse::<FieldId>(), Ok(FieldId::HeatLoss));
        assert!("heat".parse::<FieldId>().is_err());
        assert!(FieldId::CoordinateY.is_numeric());
        assert!(!FieldId::SupplySystem.is_numeric());
    }
}
