//! Attribute text formatting for CAD blocks

use crate::record::{FieldId, FieldValue};
use regex::Regex;
use std::sync::LazyLock;

/// Renders a field value as block attribute text
pub trait AttributeFormatter {
    fn format(&self, field: FieldId, value: &FieldValue) -> String;
}

/// Writes every value verbatim
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl AttributeFormatter for PlainFormatter {
    fn format(&self, _field: FieldId, value: &FieldValue) -> String {
        value.to_string()
    }
}

/// Appends units to measured quantities and abbreviates room names
///
/// Examples:
/// - area `25.5` → `"25.5 м²"`
/// - air supply `150` → `"150 м³/ч"`
/// - heat loss `1200` → `"1200 Вт"`
/// - temperature `22` → `"22.0°C"`
/// - room name `"Кабинет проектировщика"` → `"Каб. проектировщика"`
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitFormatter;

impl AttributeFormatter for UnitFormatter {
    fn format(&self, field: FieldId, value: &FieldValue) -> String {
        let unit: Option<(usize, &str)> = match field {
            FieldId::Area => Some((1, " м²")),
            FieldId::AirSupply | FieldId::AirExtract => Some((0, " м³/ч")),
            FieldId::HeatLoss => Some((0, " Вт")),
            FieldId::Temperature => Some((1, "°C")),
            _ => None,
        };

        if let Some((precision, suffix)) = unit {
            return match value.as_number() {
                Some(n) => format!("{n:.precision$}{suffix}"),
                None => "0".to_string(),
            };
        }

        match field {
            FieldId::RoomName => abbreviate_room_name(&value.to_string()),
            _ => value.to_string(),
        }
    }
}

/// Whole-word abbreviations for long room-name words
static ABBREVIATIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        ("Помещение", "Пом."),
        ("помещение", "пом."),
        ("Кабинет", "Каб."),
        ("кабинет", "каб."),
        ("Лаборатория", "Лаб."),
        ("лаборатория", "лаб."),
        ("Производственное", "Произв."),
        ("производственное", "произв."),
        ("Техническое", "Тех."),
        ("техническое", "тех."),
    ]
    .into_iter()
    .map(|(word, short)| (Regex::new(&format!(r"\b{word}\b")).unwrap(), short))
    .collect()
});

/// Shorten long words in a room name
pub fn abbreviate_room_name(name: &str) -> String {
    let mut result = name.to_string();
    for (pattern, short) in ABBREVIATIONS.iter() {
        result = pattern.replace_all(&result, *short).into_owned();
    }
    result
}
