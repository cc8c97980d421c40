//! Workbook access: file checks and cell grids via calamine

use crate::mapping::{Cell, RawRow};
use calamine::{open_workbook_auto, Data, Reader};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Extensions calamine can open
const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("unsupported file type (expected .xlsx, .xlsm, .xls or .ods): {0}")]
    UnsupportedFormat(PathBuf),

    #[error("file is empty: {0}")]
    Empty(PathBuf),

    #[error("invalid workbook {path}: {message}")]
    BadFormat { path: PathBuf, message: String },

    #[error("sheet '{sheet}' not found, available: {available:?}")]
    MissingSheet {
        sheet: String,
        available: Vec<String>,
    },
}

impl LoadError {
    fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => LoadError::PermissionDenied(path.to_path_buf()),
            _ => LoadError::BadFormat {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        }
    }
}

/// Clean up a user-supplied path: surrounding whitespace and quotes, `.` parts
pub fn normalize_file_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);

    Path::new(unquoted)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Verify that a file exists, has a spreadsheet extension, is readable and non-empty
pub fn check_file_availability(path: &Path) -> Result<(), LoadError> {
    let metadata = fs::metadata(path).map_err(|e| LoadError::from_io(path, e))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(LoadError::UnsupportedFormat(path.to_path_buf()));
    }

    fs::File::open(path).map_err(|e| LoadError::from_io(path, e))?;

    if metadata.len() == 0 {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    log::debug!("{}: {} bytes", path.display(), metadata.len());
    Ok(())
}

/// Load a sheet as an absolute cell grid.
///
/// Row and column indices match the spreadsheet (row 0 is spreadsheet row 1)
/// even when the used range starts further down. Without `sheet` the first
/// sheet is used.
pub fn load_grid(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<Cell>>, LoadError> {
    check_file_availability(path)?;

    let bad_format = |message: String| LoadError::BadFormat {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| match e {
        calamine::Error::Io(io) => LoadError::from_io(path, io),
        other => bad_format(other.to_string()),
    })?;

    let sheet_names = workbook.sheet_names().to_owned();
    let used_sheet = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| LoadError::MissingSheet {
                sheet: name.to_string(),
                available: sheet_names.clone(),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| bad_format("workbook has no worksheet".to_string()))?,
    };

    let range = workbook
        .worksheet_range(&used_sheet)
        .map_err(|e| bad_format(e.to_string()))?;

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut grid: Vec<Vec<Cell>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col as usize];
        cells.extend(row.iter().map(cell_from_data));
        grid.push(cells);
    }

    log::debug!(
        "Read {} rows from {} [{}]",
        grid.len(),
        path.display(),
        used_sheet
    );
    Ok(grid)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(v) => Cell::Number(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Bool(v) => Cell::Bool(*v),
        other => Cell::Text(other.to_string()),
    }
}

/// Load a sheet as keyed rows under its header row
pub fn load_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<RawRow>, LoadError> {
    Ok(rows_with_header(&load_grid(path, sheet)?))
}

/// Index of the first row holding any non-empty cell
fn header_row(grid: &[Vec<Cell>]) -> Option<usize> {
    grid.iter().position(|row| row.iter().any(|c| !c.is_empty()))
}

/// Header names of the first non-blank row, trimmed
pub fn header_names(grid: &[Vec<Cell>]) -> Vec<String> {
    header_row(grid)
        .map(|i| grid[i].iter().map(Cell::to_text).collect())
        .unwrap_or_default()
}

/// Turn a grid into keyed rows, taking the first non-blank row as the header.
///
/// Cells under an empty header are dropped; fully blank rows are skipped.
/// When a header text repeats, the leftmost column keeps the name.
pub fn rows_with_header(grid: &[Vec<Cell>]) -> Vec<RawRow> {
    let Some(start) = header_row(grid) else {
        return Vec::new();
    };
    let headers = header_names(grid);

    grid.iter()
        .skip(start + 1)
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .map(|row| {
            let mut keyed = RawRow::new();
            for (i, h) in headers.iter().enumerate() {
                if h.is_empty() || keyed.contains_key(h) {
                    continue;
                }
                keyed.insert(h.clone(), row.get(i).cloned().unwrap_or_default());
            }
            keyed
        })
        .collect()
}
