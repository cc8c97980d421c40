//! JSON-backed drawing adapter

use super::{Attributes, CadConnector, CadError};
use crate::placement::Point;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A block definition and the attribute tags its instances carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// A placed block reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInstance {
    pub name: String,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub attributes: Attributes,
}

/// Drawing stored as a JSON document of block definitions and instances.
///
/// Entities are instance indices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrawingFile {
    #[serde(default)]
    pub blocks: Vec<BlockDefinition>,
    #[serde(default)]
    pub instances: Vec<BlockInstance>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl DrawingFile {
    /// Open a drawing file
    pub fn open(path: &Path) -> Result<Self, CadError> {
        let content = fs::read_to_string(path)?;
        let mut drawing = Self::parse_str(&content)?;
        drawing.path = Some(path.to_path_buf());
        log::debug!(
            "Opened drawing {}: {} definitions, {} instances",
            path.display(),
            drawing.blocks.len(),
            drawing.instances.len()
        );
        Ok(drawing)
    }

    pub fn parse_str(content: &str) -> Result<Self, CadError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Write to `path` on the next `save`
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn instance(&self, entity: usize) -> Result<&BlockInstance, CadError> {
        self.instances
            .get(entity)
            .ok_or_else(|| CadError::UnknownEntity(format!("#{entity}")))
    }

    fn definition(&self, name: &str) -> Option<&BlockDefinition> {
        let upper = name.to_uppercase();
        self.blocks.iter().find(|b| b.name.to_uppercase() == upper)
    }
}

impl CadConnector for DrawingFile {
    type Entity = usize;

    fn block_references(&self) -> Result<Vec<(usize, String)>, CadError> {
        Ok(self
            .instances
            .iter()
            .enumerate()
            .map(|(i, inst)| (i, inst.name.clone()))
            .collect())
    }

    fn read_attributes(&self, entity: &usize) -> Result<Attributes, CadError> {
        Ok(self.instance(*entity)?.attributes.clone())
    }

    fn write_attributes(&mut self, entity: &usize, values: &Attributes) -> Result<(), CadError> {
        let instance = self
            .instances
            .get_mut(*entity)
            .ok_or_else(|| CadError::UnknownEntity(format!("#{entity}")))?;

        for (tag, text) in instance.attributes.iter_mut() {
            let upper = tag.to_uppercase();
            if let Some((_, value)) = values.iter().find(|(t, _)| t.to_uppercase() == upper) {
                *text = value.clone();
            }
        }
        Ok(())
    }

    fn insert_instance(&mut self, template: &str, point: Point) -> Result<usize, CadError> {
        let definition = self
            .definition(template)
            .ok_or_else(|| CadError::UnknownBlock(template.to_string()))?;

        let instance = BlockInstance {
            name: definition.name.clone(),
            position: point,
            attributes: definition
                .attributes
                .iter()
                .map(|tag| (tag.clone(), String::new()))
                .collect(),
        };
        self.instances.push(instance);
        Ok(self.instances.len() - 1)
    }

    fn available_blocks(&self) -> Result<Vec<String>, CadError> {
        let mut names: Vec<String> = self
            .blocks
            .iter()
            .filter(|b| !b.name.starts_with('*'))
            .map(|b| b.name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn save(&mut self) -> Result<(), CadError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        log::info!("Saved drawing {}", path.display());
        Ok(())
    }
}
