//! CAD collaborator interface and block synchronisation

mod drawing;
mod sync;

pub use drawing::{BlockDefinition, BlockInstance, DrawingFile};
pub use sync::{BlockSync, CreateStats, UpdateStats};

use crate::placement::Point;
use std::collections::BTreeMap;
use thiserror::Error;

/// Attribute tag → text
pub type Attributes = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum CadError {
    #[error("no such entity: {0}")]
    UnknownEntity(String),

    #[error("block definition not found: {0}")]
    UnknownBlock(String),

    #[error("drawing I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed drawing: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Connector(String),
}

/// Access to a drawing session.
///
/// All calls are synchronous; any of them may fail for a single entity, which
/// callers treat as a per-record error.
pub trait CadConnector {
    /// Handle to one block instance
    type Entity: Clone + std::fmt::Debug;

    /// Every block instance with its effective block name
    fn block_references(&self) -> Result<Vec<(Self::Entity, String)>, CadError>;

    fn read_attributes(&self, entity: &Self::Entity) -> Result<Attributes, CadError>;

    /// Set attribute text for the given tags; tags the block lacks are ignored
    fn write_attributes(&mut self, entity: &Self::Entity, values: &Attributes)
        -> Result<(), CadError>;

    fn insert_instance(&mut self, template: &str, point: Point) -> Result<Self::Entity, CadError>;

    /// Names of user block definitions, sorted
    fn available_blocks(&self) -> Result<Vec<String>, CadError>;

    fn save(&mut self) -> Result<(), CadError>;

    /// Block instances that represent rooms: the name contains one of
    /// `target_blocks` (case-insensitive) and the room-number attribute is set
    fn find_room_entities(
        &self,
        target_blocks: &[String],
        room_tag: &str,
    ) -> Result<Vec<Self::Entity>, CadError> {
        let targets: Vec<String> = target_blocks.iter().map(|t| t.to_uppercase()).collect();
        let mut rooms = Vec::new();

        for (entity, name) in self.block_references()? {
            let upper = name.to_uppercase();
            if !targets.iter().any(|t| upper.contains(t.as_str())) {
                continue;
            }
            match self.read_attributes(&entity) {
                Ok(attrs) => {
                    let number = lookup_tag(&attrs, room_tag).map(str::trim).unwrap_or("");
                    if number.is_empty() {
                        continue;
                    }
                    log::debug!("Room block {number}: {name}");
                    rooms.push(entity);
                }
                Err(e) => log::warn!("Skipping block {name}: {e}"),
            }
        }

        log::info!("Found {} room blocks", rooms.len());
        Ok(rooms)
    }

    fn block_exists(&self, name: &str) -> Result<bool, CadError> {
        Ok(self
            .available_blocks()?
            .iter()
            .any(|b| b.to_uppercase() == name.to_uppercase()))
    }
}

/// Case-insensitive attribute lookup
pub fn lookup_tag<'a>(attrs: &'a Attributes, tag: &str) -> Option<&'a str> {
    let tag = tag.to_uppercase();
    attrs
        .iter()
        .find(|(t, _)| t.to_uppercase() == tag)
        .map(|(_, v)| v.as_str())
}
