//! Multi-source merge of room records
//!
//! Every source is authoritative for a subset of fields at a declared
//! priority. Sources are folded in declaration order into one record per room
//! number; a field takes the value of the highest-priority source that is
//! allowed to set it and actually supplied something. On equal priority the
//! later source wins.

use crate::mapping::FieldMapping;
use crate::parser::{normalize_file_path, read_room_data};
use crate::record::{FieldId, RoomRecord};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

/// Fields a source may contribute
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AllowedFields {
    #[default]
    All,
    Only(BTreeSet<FieldId>),
}

impl AllowedFields {
    /// An empty list means every field
    pub fn from_fields(fields: &[FieldId]) -> Self {
        if fields.is_empty() {
            AllowedFields::All
        } else {
            AllowedFields::Only(fields.iter().copied().collect())
        }
    }

    pub fn permits(&self, field: FieldId) -> bool {
        match self {
            AllowedFields::All => true,
            AllowedFields::Only(set) => set.contains(&field),
        }
    }
}

/// Declaration of a spreadsheet source (one `[[source]]` entry)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    #[serde(default)]
    pub sheet_name: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldId>,
    #[serde(default)]
    pub priority: i64,
}

/// An already-parsed source ready for merging
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    pub name: String,
    pub rows: Vec<RoomRecord>,
    pub allowed_fields: AllowedFields,
    pub priority: i64,
    /// Why the source contributed nothing, if it failed to load
    pub error: Option<String>,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, rows: Vec<RoomRecord>) -> Self {
        Self {
            name: name.into(),
            rows,
            allowed_fields: AllowedFields::All,
            priority: 0,
            error: None,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_fields(mut self, fields: &[FieldId]) -> Self {
        self.allowed_fields = AllowedFields::from_fields(fields);
        self
    }

    /// A source that could not be loaded; contributes zero records
    pub fn failed(spec: &SourceSpec, error: impl Into<String>) -> Self {
        Self {
            name: spec.name.clone(),
            rows: Vec::new(),
            allowed_fields: AllowedFields::from_fields(&spec.fields),
            priority: spec.priority,
            error: Some(error.into()),
        }
    }
}

/// Per-source merge statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStats {
    pub name: String,
    pub rooms: usize,
    pub fields_added: usize,
    pub failed: bool,
}

/// Merge result: one record per room, provenance stripped
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Merged records. Order is not meaningful.
    pub records: Vec<RoomRecord>,
    /// Statistics in source declaration order
    pub stats: Vec<SourceStats>,
}

impl MergeOutcome {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Which source last set a field, and at what priority
struct Provenance<'a> {
    source: &'a str,
    priority: i64,
}

struct MergedRecord<'a> {
    record: RoomRecord,
    provenance: HashMap<FieldId, Provenance<'a>>,
}

/// Load every declared source with the given column mapping.
///
/// Sources are independent and read in parallel; the result keeps
/// declaration order. A source without a file or whose load fails becomes an
/// empty, failed descriptor.
pub fn load_sources(specs: &[SourceSpec], mapping: &FieldMapping) -> Vec<SourceDescriptor> {
    specs
        .par_iter()
        .map(|spec| {
            let Some(file_path) = &spec.file_path else {
                log::warn!("Source '{}' has no file path", spec.name);
                return SourceDescriptor::failed(spec, "no file path");
            };
            let path = normalize_file_path(&file_path.to_string_lossy());

            match read_room_data(&path, spec.sheet_name.as_deref(), mapping) {
                Ok(rows) => SourceDescriptor {
                    name: spec.name.clone(),
                    rows,
                    allowed_fields: AllowedFields::from_fields(&spec.fields),
                    priority: spec.priority,
                    error: None,
                },
                Err(e) => {
                    log::warn!("Source '{}' dropped: {e}", spec.name);
                    SourceDescriptor::failed(spec, e.to_string())
                }
            }
        })
        .collect()
}

/// Fold sources into one record per room number.
///
/// This is a single sequential pass in slice order, which is what makes
/// equal-priority ties go to the later source.
pub fn merge_sources(sources: &[SourceDescriptor]) -> MergeOutcome {
    let mut merged: Vec<MergedRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut stats = Vec::with_capacity(sources.len());

    for source in sources {
        let mut rooms = 0;
        let mut fields_added = 0;

        for row in &source.rows {
            // RoomRecord guarantees a non-empty room number
            let room_number = row.room_number();

            let slot = *index.entry(room_number.to_string()).or_insert_with(|| {
                merged.push(MergedRecord {
                    record: row.key_only(),
                    provenance: HashMap::new(),
                });
                merged.len() - 1
            });
            let target = &mut merged[slot];

            for (field, value) in row.fields() {
                if !source.allowed_fields.permits(field) || !value.is_provided() {
                    continue;
                }

                if let Some(previous) = target.provenance.get(&field) {
                    if source.priority < previous.priority {
                        continue;
                    }
                    log::debug!(
                        "Room {room_number}: {field} from '{}' overrides '{}'",
                        source.name,
                        previous.source
                    );
                }

                target.record.set(field, value.clone());
                target.provenance.insert(
                    field,
                    Provenance {
                        source: &source.name,
                        priority: source.priority,
                    },
                );
                fields_added += 1;
            }

            rooms += 1;
        }

        if source.error.is_none() {
            log::info!(
                "Source '{}': {rooms} rooms, {fields_added} fields",
                source.name
            );
        }
        stats.push(SourceStats {
            name: source.name.clone(),
            rooms,
            fields_added,
            failed: source.error.is_some(),
        });
    }

    log::info!("Merged {} rooms from {} sources", merged.len(), sources.len());

    MergeOutcome {
        records: merged.into_iter().map(|m| m.record).collect(),
        stats,
    }
}

/// Load and merge in one step
pub fn merge_from_specs(specs: &[SourceSpec], mapping: &FieldMapping) -> MergeOutcome {
    merge_sources(&load_sources(specs, mapping))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(number: &str) -> RoomRecord {
        RoomRecord::new(number).unwrap()
    }

    fn find<'a>(outcome: &'a MergeOutcome, number: &str) -> &'a RoomRecord {
        outcome
            .records
            .iter()
            .find(|r| r.room_number() == number)
            .unwrap()
    }

    #[test]
    fn test_zero_sources() {
        let outcome = merge_sources(&[]);
        assert!(outcome.is_empty());
        assert!(outcome.stats.is_empty());
    }

    #[test]
    fn test_zero_value_does_not_override() {
        // Higher priority source supplies heat_loss = 0, which means "not provided"
        let heat = SourceDescriptor::new(
            "heat_loss",
            vec![room("101")
                .with(FieldId::HeatLoss, 1200.0)
                .with(FieldId::Temperature, 22.0)],
        )
        .with_priority(1)
        .with_fields(&[FieldId::HeatLoss, FieldId::Temperature]);

        let air = SourceDescriptor::new(
            "air_exchange",
            vec![room("101")
                .with(FieldId::Area, 25.5)
                .with(FieldId::HeatLoss, 0.0)],
        )
        .with_priority(2)
        .with_fields(&[FieldId::Area, FieldId::HeatLoss]);

        let outcome = merge_sources(&[heat, air]);
        assert_eq!(outcome.records.len(), 1);

        let rec = find(&outcome, "101");
        assert_eq!(rec.number(FieldId::HeatLoss), Some(1200.0));
        assert_eq!(rec.number(FieldId::Temperature), Some(22.0));
        assert_eq!(rec.number(FieldId::Area), Some(25.5));
        assert_eq!(rec.len(), 3);

        assert_eq!(outcome.stats[0].fields_added, 2);
        assert_eq!(outcome.stats[1].fields_added, 1);
    }

    #[test]
    fn test_equal_priority_later_source_wins() {
        let a = SourceDescriptor::new("a", vec![room("200").with(FieldId::RoomName, "Склад")])
            .with_priority(5);
        let b = SourceDescriptor::new("b", vec![room("200").with(FieldId::RoomName, "Архив")])
            .with_priority(5);

        let outcome = merge_sources(&[a.clone(), b.clone()]);
        assert_eq!(find(&outcome, "200").text(FieldId::RoomName), Some("Архив"));

        let outcome = merge_sources(&[b, a]);
        assert_eq!(find(&outcome, "200").text(FieldId::RoomName), Some("Склад"));
    }

    #[test]
    fn test_higher_priority_wins_regardless_of_order() {
        let low = SourceDescriptor::new("low", vec![room("1").with(FieldId::Area, 10.0)])
            .with_priority(1);
        let high = SourceDescriptor::new("high", vec![room("1").with(FieldId::Area, 12.0)])
            .with_priority(3);

        for sources in [[low.clone(), high.clone()], [high, low]] {
            let outcome = merge_sources(&sources);
            assert_eq!(find(&outcome, "1").number(FieldId::Area), Some(12.0));
        }
    }

    #[test]
    fn test_allow_list_blocks_other_fields() {
        let base = SourceDescriptor::new(
            "base",
            vec![room("7")
                .with(FieldId::Area, 30.0)
                .with(FieldId::RoomName, "Зал")],
        );
        let heat = SourceDescriptor::new(
            "heat",
            vec![room("7")
                .with(FieldId::Area, 99.0)
                .with(FieldId::RoomName, "Другое")
                .with(FieldId::HeatLoss, 800.0)],
        )
        .with_priority(10)
        .with_fields(&[FieldId::HeatLoss]);

        let outcome = merge_sources(&[base, heat]);
        let rec = find(&outcome, "7");
        assert_eq!(rec.number(FieldId::Area), Some(30.0));
        assert_eq!(rec.text(FieldId::RoomName), Some("Зал"));
        assert_eq!(rec.number(FieldId::HeatLoss), Some(800.0));
    }

    #[test]
    fn test_allow_list_field_not_set_on_new_room() {
        let heat = SourceDescriptor::new("heat", vec![room("8").with(FieldId::Area, 99.0)])
            .with_fields(&[FieldId::HeatLoss]);

        let outcome = merge_sources(&[heat]);
        let rec = find(&outcome, "8");
        assert!(rec.is_empty());
        assert_eq!(outcome.stats[0].rooms, 1);
        assert_eq!(outcome.stats[0].fields_added, 0);
    }

    #[test]
    fn test_empty_text_not_provided() {
        let a = SourceDescriptor::new("a", vec![room("3").with(FieldId::SupplySystem, "П1")])
            .with_priority(1);
        let b = SourceDescriptor::new("b", vec![room("3").with(FieldId::SupplySystem, "")])
            .with_priority(2);

        let outcome = merge_sources(&[a, b]);
        assert_eq!(find(&outcome, "3").text(FieldId::SupplySystem), Some("П1"));
    }

    #[test]
    fn test_one_record_per_room() {
        let a = SourceDescriptor::new(
            "a",
            vec![room("1"), room("2"), room("1").with(FieldId::Area, 5.0)],
        );
        let b = SourceDescriptor::new("b", vec![room("2"), room("3")]);

        let outcome = merge_sources(&[a, b]);
        let mut numbers: Vec<_> = outcome.records.iter().map(|r| r.room_number()).collect();
        numbers.sort();
        assert_eq!(numbers, vec!["1", "2", "3"]);
        assert_eq!(outcome.stats[0].rooms, 3);
    }

    #[test]
    fn test_failed_source_contributes_nothing() {
        let spec = SourceSpec {
            name: "broken".into(),
            file_path: None,
            sheet_name: None,
            fields: vec![],
            priority: 9,
        };
        let good = SourceDescriptor::new("good", vec![room("5").with(FieldId::Area, 4.0)]);

        let outcome = merge_sources(&[SourceDescriptor::failed(&spec, "no file path"), good]);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(
            outcome.stats[0],
            SourceStats {
                name: "broken".into(),
                rooms: 0,
                fields_added: 0,
                failed: true
            }
        );
    }

    #[test]
    fn test_load_sources_without_file_or_missing_file() {
        let specs = vec![
            SourceSpec {
                name: "none".into(),
                file_path: None,
                sheet_name: None,
                fields: vec![],
                priority: 0,
            },
            SourceSpec {
                name: "missing".into(),
                file_path: Some(PathBuf::from("/nonexistent/air.xlsx")),
                sheet_name: None,
                fields: vec![FieldId::Area],
                priority: 2,
            },
        ];

        let loaded = load_sources(&specs, &FieldMapping::default());
        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().all(|s| s.rows.is_empty() && s.error.is_some()));
        assert_eq!(loaded[1].name, "missing");
        assert_eq!(loaded[1].priority, 2);

        assert!(merge_from_specs(&specs, &FieldMapping::default()).is_empty());
    }

    #[test]
    fn test_allowed_fields_from_empty_list() {
        assert_eq!(AllowedFields::from_fields(&[]), AllowedFields::All);
        assert!(AllowedFields::from_fields(&[FieldId::Area]).permits(FieldId::Area));
        assert!(!AllowedFields::from_fields(&[FieldId::Area]).permits(FieldId::HeatLoss));
    }
}
