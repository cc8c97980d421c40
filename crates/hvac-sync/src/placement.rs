//! Insertion-point arithmetic for new room blocks

use crate::record::{FieldId, RoomRecord};
use serde::{Deserialize, Serialize};

/// A 3D insertion point in drawing units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// Grid auto-placement defaults (`placement_settings.grid`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSettings {
    #[serde(default)]
    pub default_start_x: f64,
    #[serde(default)]
    pub default_start_y: f64,
    #[serde(default = "default_spacing_x")]
    pub default_spacing_x: f64,
    #[serde(default = "default_spacing_y")]
    pub default_spacing_y: f64,
    #[serde(default = "default_blocks_per_row")]
    pub blocks_per_row: usize,
}

fn default_spacing_x() -> f64 {
    100.0
}
fn default_spacing_y() -> f64 {
    50.0
}
fn default_blocks_per_row() -> usize {
    10
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            default_start_x: 0.0,
            default_start_y: 0.0,
            default_spacing_x: default_spacing_x(),
            default_spacing_y: default_spacing_y(),
            blocks_per_row: default_blocks_per_row(),
        }
    }
}

impl GridSettings {
    pub fn start(&self) -> (f64, f64) {
        (self.default_start_x, self.default_start_y)
    }

    pub fn spacing(&self) -> (f64, f64) {
        (self.default_spacing_x, self.default_spacing_y)
    }
}

/// Position of the `index`-th block on a grid filled row by row, rows going down
pub fn grid_point(index: usize, start: (f64, f64), spacing: (f64, f64), per_row: usize) -> Point {
    let per_row = per_row.max(1);
    let row = index / per_row;
    let col = index % per_row;
    Point::new(
        start.0 + col as f64 * spacing.0,
        start.1 - row as f64 * spacing.1,
    )
}

/// Whether any of the first five records carries usable coordinates
pub fn has_coordinates(records: &[RoomRecord]) -> bool {
    records.iter().take(5).any(|r| {
        let x = r.number(FieldId::CoordinateX).unwrap_or(0.0);
        let y = r.number(FieldId::CoordinateY).unwrap_or(0.0);
        x != 0.0 && y != 0.0
    })
}

/// Per-record coordinates; `None` when both are zero or missing
pub fn extract_coordinates(records: &[RoomRecord]) -> Vec<Option<Point>> {
    records
        .iter()
        .map(|r| {
            let x = r.number(FieldId::CoordinateX).unwrap_or(0.0);
            let y = r.number(FieldId::CoordinateY).unwrap_or(0.0);
            (x != 0.0 || y != 0.0).then(|| Point::new(x, y))
        })
        .collect()
}
