//! Writing room records into drawing blocks and reading them back

use super::{lookup_tag, Attributes, CadConnector, CadError};
use crate::config::SyncConfig;
use crate::mapping::{AttributeFormatter, UnitFormatter};
use crate::placement::{grid_point, Point};
use crate::record::{FieldId, RoomRecord};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    pub updated: usize,
    /// Blocks whose attributes already matched
    pub unchanged: usize,
    /// Blocks with no record for their room number
    pub not_found: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateStats {
    pub created: usize,
    pub errors: usize,
}

/// Synchronises room records with the room blocks of one drawing
pub struct BlockSync<'a, C: CadConnector> {
    config: &'a SyncConfig,
    connector: &'a mut C,
    formatter: Box<dyn AttributeFormatter + 'a>,
}

impl<'a, C: CadConnector> BlockSync<'a, C> {
    /// Uses [`UnitFormatter`] for attribute text
    pub fn new(config: &'a SyncConfig, connector: &'a mut C) -> Self {
        Self {
            config,
            connector,
            formatter: Box::new(UnitFormatter),
        }
    }

    pub fn with_formatter(mut self, formatter: impl AttributeFormatter + 'a) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn connector(&self) -> &C {
        &*self.connector
    }

    /// Room block instances in the drawing
    pub fn room_entities(&self) -> Result<Vec<C::Entity>, CadError> {
        self.connector
            .find_room_entities(&self.config.target_blocks, self.config.room_number_tag())
    }

    /// Attribute text for every configured tag the record has a value for
    fn attribute_text(&self, record: &RoomRecord) -> Attributes {
        self.config
            .block_attributes
            .iter()
            .filter_map(|(&field, tag)| {
                let text = match field {
                    FieldId::RoomNumber => record.room_number().to_string(),
                    _ => self.formatter.format(field, &record.get(field)?),
                };
                Some((tag.clone(), text))
            })
            .collect()
    }

    /// Write merged records into the matching room blocks.
    ///
    /// Only tags whose text changes are written. A failing block is counted
    /// and skipped. The drawing is saved once at the end if anything changed.
    pub fn update_all(&mut self, records: &[RoomRecord]) -> Result<UpdateStats, CadError> {
        let by_room: HashMap<&str, &RoomRecord> =
            records.iter().map(|r| (r.room_number(), r)).collect();
        let room_tag = self.config.room_number_tag().to_string();

        let mut stats = UpdateStats::default();

        for entity in self.room_entities()? {
            let current = match self.connector.read_attributes(&entity) {
                Ok(attrs) => attrs,
                Err(e) => {
                    log::warn!("Failed to read block {entity:?}: {e}");
                    stats.errors += 1;
                    continue;
                }
            };

            let room_number = lookup_tag(&current, &room_tag).unwrap_or("").trim();
            let Some(record) = by_room.get(room_number) else {
                log::debug!("Room {room_number}: no data");
                stats.not_found += 1;
                continue;
            };

            let changes: Attributes = self
                .attribute_text(record)
                .into_iter()
                .filter(|(tag, text)| {
                    lookup_tag(&current, tag).is_some_and(|old| old != text.as_str())
                })
                .collect();

            if changes.is_empty() {
                stats.unchanged += 1;
                continue;
            }

            match self.connector.write_attributes(&entity, &changes) {
                Ok(()) => {
                    for (tag, text) in &changes {
                        log::debug!("Room {room_number}: {tag} = '{text}'");
                    }
                    stats.updated += 1;
                }
                Err(e) => {
                    log::warn!("Room {room_number}: update failed: {e}");
                    stats.errors += 1;
                }
            }
        }

        if stats.updated > 0 {
            self.save();
        }

        log::info!(
            "Updated {} blocks, {} unchanged, {} without data, {} errors",
            stats.updated,
            stats.unchanged,
            stats.not_found,
            stats.errors
        );
        Ok(stats)
    }

    /// Read block attributes back as records.
    ///
    /// Attribute text is kept verbatim. Tags without a configured field are
    /// ignored; blocks without a room number are skipped.
    pub fn read_blocks(&self, entities: &[C::Entity]) -> Vec<RoomRecord> {
        let mapping = self.config.block_mapping();
        let room_tag = self.config.room_number_tag();
        let mut records = Vec::with_capacity(entities.len());

        for entity in entities {
            let attrs = match self.connector.read_attributes(entity) {
                Ok(attrs) => attrs,
                Err(e) => {
                    log::warn!("Failed to read block {entity:?}: {e}");
                    continue;
                }
            };

            let Some(mut record) = lookup_tag(&attrs, room_tag).and_then(RoomRecord::new) else {
                log::warn!("Block {entity:?} has no room number");
                continue;
            };

            for (tag, text) in &attrs {
                if let Some(field) = mapping.field_for(tag) {
                    record.set(field, text.trim());
                }
            }
            records.push(record);
        }

        log::info!("Read {} room blocks", records.len());
        records
    }

    /// Create one instance per record, laid out on a grid.
    ///
    /// Start and spacing fall back to the configured grid.
    pub fn create_on_grid(
        &mut self,
        records: &[RoomRecord],
        template: &str,
        start: Option<(f64, f64)>,
        spacing: Option<(f64, f64)>,
    ) -> CreateStats {
        let grid = self.config.grid();
        let start = start.unwrap_or_else(|| grid.start());
        let spacing = spacing.unwrap_or_else(|| grid.spacing());
        let per_row = grid.blocks_per_row;

        let points: Vec<Point> = (0..records.len())
            .map(|i| grid_point(i, start, spacing, per_row))
            .collect();
        self.create_at(records, template, &points)
    }

    /// Create instances at the given points, pairing records and points in
    /// order. Extra records or points are ignored.
    pub fn create_at(
        &mut self,
        records: &[RoomRecord],
        template: &str,
        points: &[Point],
    ) -> CreateStats {
        let mut stats = CreateStats::default();

        match self.connector.block_exists(template) {
            Ok(true) => {}
            Ok(false) => {
                log::error!("Template block '{template}' not found");
                return stats;
            }
            Err(e) => {
                log::error!("Failed to list block definitions: {e}");
                return stats;
            }
        }

        if records.len() != points.len() {
            log::warn!(
                "{} records for {} points; creating {}",
                records.len(),
                points.len(),
                records.len().min(points.len())
            );
        }

        for (record, point) in records.iter().zip(points) {
            match self.create_one(record, template, *point) {
                Ok(()) => {
                    log::debug!(
                        "Room {}: created at ({:.1}, {:.1})",
                        record.room_number(),
                        point.x,
                        point.y
                    );
                    stats.created += 1;
                }
                Err(e) => {
                    log::warn!("Room {}: create failed: {e}", record.room_number());
                    stats.errors += 1;
                }
            }
        }

        if stats.created > 0 {
            self.save();
        }
        log::info!("Created {} blocks, {} errors", stats.created, stats.errors);
        stats
    }

    fn create_one(
        &mut self,
        record: &RoomRecord,
        template: &str,
        point: Point,
    ) -> Result<(), CadError> {
        let entity = self.connector.insert_instance(template, point)?;
        let text = self.attribute_text(record);
        self.connector.write_attributes(&entity, &text)
    }

    fn save(&mut self) {
        if let Err(e) = self.connector.save() {
            log::error!("Failed to save drawing: {e}");
        }
    }
}
