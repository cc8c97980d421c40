//! Loader for the `block_mapping.json` configuration file

use crate::mapping::FieldMapping;
use crate::merge::SourceSpec;
use crate::placement::GridSettings;
use crate::record::FieldId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_TEMPLATE_BLOCK: &str = "HVAC_ROOM_DATA";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse sources file {path}")]
    Sources {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("excel_columns has no column for '{0}'")]
    MissingColumn(FieldId),

    #[error("block_attributes has no tag for '{0}'")]
    MissingAttribute(FieldId),
}

/// Run configuration, loaded once and passed by reference afterwards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Field → spreadsheet column header, in output column order
    #[serde(default)]
    pub excel_columns: IndexMap<FieldId, String>,
    /// Field → CAD block attribute tag
    #[serde(default)]
    pub block_attributes: IndexMap<FieldId, String>,
    /// Substrings identifying room blocks by name
    #[serde(default)]
    pub target_blocks: Vec<String>,
    /// Fields allowed to flow from blocks back into spreadsheets
    #[serde(default = "default_reverse_import_fields")]
    pub reverse_import_fields: Vec<FieldId>,
    #[serde(default)]
    pub placement_settings: PlacementSettings,
    #[serde(default = "default_template_block")]
    pub default_template_block: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlacementSettings {
    #[serde(default)]
    pub grid: GridSettings,
}

fn default_reverse_import_fields() -> Vec<FieldId> {
    vec![FieldId::SupplySystem, FieldId::ExtractSystem]
}

fn default_template_block() -> String {
    DEFAULT_TEMPLATE_BLOCK.to_string()
}

impl SyncConfig {
    /// Read and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: SyncConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        log::debug!(
            "Loaded config {}: {} columns, {} attributes, {} target blocks",
            path.display(),
            config.excel_columns.len(),
            config.block_attributes.len(),
            config.target_blocks.len()
        );
        Ok(config)
    }

    /// Both sides must know where the room number lives
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.excel_columns.contains_key(&FieldId::RoomNumber) {
            return Err(ConfigError::MissingColumn(FieldId::RoomNumber));
        }
        if !self.block_attributes.contains_key(&FieldId::RoomNumber) {
            return Err(ConfigError::MissingAttribute(FieldId::RoomNumber));
        }
        Ok(())
    }

    /// Column mapping for spreadsheet sources
    pub fn excel_mapping(&self) -> FieldMapping {
        FieldMapping::new(self.excel_columns.clone())
    }

    /// Tag mapping for CAD blocks
    pub fn block_mapping(&self) -> FieldMapping {
        FieldMapping::new(self.block_attributes.clone())
    }

    pub fn grid(&self) -> &GridSettings {
        &self.placement_settings.grid
    }

    /// Attribute tag carrying the room number
    pub fn room_number_tag(&self) -> &str {
        self.block_attributes
            .get(&FieldId::RoomNumber)
            .map(String::as_str)
            .unwrap_or("ROOM_NUM")
    }
}

#[derive(Debug, Deserialize)]
struct SourcesFile {
    #[serde(default, rename = "source")]
    sources: Vec<SourceSpec>,
}

/// Read `[[source]]` declarations from a TOML file.
///
/// Relative file paths are resolved against the directory of the TOML file.
pub fn load_sources_file(path: &Path) -> Result<Vec<SourceSpec>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: SourcesFile = toml::from_str(&content).map_err(|source| ConfigError::Sources {
        path: path.to_path_buf(),
        source,
    })?;

    let base = path.parent().unwrap_or(Path::new(""));
    let sources = file
        .sources
        .into_iter()
        .map(|mut spec| {
            if let Some(file_path) = spec.file_path.take() {
                spec.file_path = Some(if file_path.is_relative() {
                    base.join(file_path)
                } else {
                    file_path
                });
            }
            spec
        })
        .collect::<Vec<_>>();

    log::debug!("Loaded {} sources from {}", sources.len(), path.display());
    Ok(sources)
}

impl Default for SyncConfig {
    fn default() -> Self {
        let excel_columns = [
            (FieldId::RoomNumber, "Номер помещения"),
            (FieldId::RoomName, "Наименование"),
            (FieldId::Area, "Площадь, м²"),
            (FieldId::AirSupply, "Приток, м³/ч"),
            (FieldId::AirExtract, "Вытяжка, м³/ч"),
            (FieldId::HeatLoss, "Теплопотери, Вт"),
            (FieldId::SupplySystem, "Приточная система"),
            (FieldId::ExtractSystem, "Вытяжная система"),
            (FieldId::CleanlinessClass, "Класс чистоты"),
            (FieldId::Temperature, "Температура, °C"),
            (FieldId::CoordinateX, "X"),
            (FieldId::CoordinateY, "Y"),
        ];
        let block_attributes = [
            (FieldId::RoomNumber, "ROOM_NUM"),
            (FieldId::RoomName, "ROOM_NAME"),
            (FieldId::Area, "AREA"),
            (FieldId::AirSupply, "AIR_SUPPLY"),
            (FieldId::AirExtract, "AIR_EXTRACT"),
            (FieldId::HeatLoss, "HEAT_LOSS"),
            (FieldId::SupplySystem, "SUPPLY_SYS"),
            (FieldId::ExtractSystem, "EXTRACT_SYS"),
            (FieldId::CleanlinessClass, "CLEAN_CLASS"),
            (FieldId::Temperature, "TEMP"),
        ];

        Self {
            excel_columns: excel_columns
                .into_iter()
                .map(|(f, c)| (f, c.to_string()))
                .collect(),
            block_attributes: block_attributes
                .into_iter()
                .map(|(f, t)| (f, t.to_string()))
                .collect(),
            target_blocks: vec!["ROOM".to_string(), "HVAC".to_string()],
            reverse_import_fields: default_reverse_import_fields(),
            placement_settings: PlacementSettings::default(),
            default_template_block: default_template_block(),
        }
    }
}
