//! Spreadsheet readers

mod heat_loss;
mod reader;
mod workbook;

pub use heat_loss::extract_heat_loss_rooms;
pub use reader::{detect_file_shape, read_room_data, validate_structure};
pub use workbook::{
    check_file_availability, header_names, load_grid, load_rows, normalize_file_path,
    rows_with_header, LoadError,
};
