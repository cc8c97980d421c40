//! Mapping between external names and room fields

mod format;
mod resolver;
mod shape;

pub use format::{abbreviate_room_name, AttributeFormatter, PlainFormatter, UnitFormatter};
pub use resolver::{Cell, FieldMapping, RawRow};
pub use shape::{detect_table_shape, TableShape, SCAN_ROWS};
