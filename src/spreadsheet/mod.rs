//! # Spreadsheet Module
//!
//! A small in-memory workbook model with an XLSX reader and writer. The output
//! workbook is amended one sheet at a time: every [`write_range`] call loads the
//! file (when present), changes one sheet and saves the whole package again.
use crate::error::VolumeSheetError;
use log::debug;
use std::path::Path;
use thiserror::Error;

pub(crate) mod cell;
pub(crate) mod excel;
pub mod range;
pub mod reference;
pub(crate) mod sheet;
pub(crate) mod writer;
pub(crate) mod xlsx;

pub use cell::CellValue;
pub use sheet::Sheet;

/// Errors raised while reading or writing spreadsheet packages.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Missing package part '{0}'")]
    MissingPartError(String),

    #[error("Invalid cell value at '{0}'!{1}: {2}")]
    CellValueError(String, String, String),

    #[error("Invalid sheet name '{0}'")]
    SheetNameError(String),
}

/// How a block of cells is combined with an existing sheet of the same name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// Clear the sheet (keeping its tab position) before writing.
    Replace,
    /// Merge the cells into the sheet, leaving other cells in place.
    Overlay,
}

/// Ordered collection of named sheets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Workbook {
    pub(crate) sheets: Vec<Sheet>,
}

impl Workbook {
    /// Reads an XLSX file.
    pub fn open(path: &Path) -> Result<Self, VolumeSheetError> {
        xlsx::read_workbook(path)
    }

    /// Saves the workbook as an XLSX file, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), VolumeSheetError> {
        writer::write_workbook(self, path)
    }

    /// Sheets in tab order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Sheet names in tab order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    /// Finds a sheet by name (case-insensitive, as spreadsheet applications do).
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name.eq_ignore_ascii_case(name))
    }

    /// Returns the named sheet for writing, creating it at the end if missing.
    /// In [`WriteMode::Replace`] an existing sheet is emptied in place.
    pub fn sheet_for_write(&mut self, name: &str, mode: WriteMode) -> Result<&mut Sheet, VolumeSheetError> {
        validate_sheet_name(name)?;
        let index = match self.sheets.iter().position(|sheet| sheet.name.eq_ignore_ascii_case(name)) {
            Some(index) => {
                if mode == WriteMode::Replace {
                    self.sheets[index].clear();
                }
                index
            }
            None => {
                self.sheets.push(Sheet::new(name));
                self.sheets.len() - 1
            }
        };
        Ok(&mut self.sheets[index])
    }
}

/// Sheet names are limited to 31 characters and may not contain `[]:*?/\`.
fn validate_sheet_name(name: &str) -> Result<(), SpreadsheetError> {
    let invalid = name.is_empty()
        || name.chars().count() > 31
        || name.contains(['[', ']', ':', '*', '?', '/', '\\']);
    if invalid {
        Err(SpreadsheetError::SheetNameError(name.to_owned()))
    } else {
        Ok(())
    }
}

/// Writes a block of rows into one sheet of the workbook file at `path`.
///
/// A missing file is created. An existing file is loaded, the named sheet is
/// replaced or overlaid according to `mode`, and the package is saved again;
/// other sheets are kept unchanged.
///
/// # Arguments
/// * `path` - Workbook file
/// * `sheet_name` - Target sheet
/// * `origin` - 0-based (row, column) of the block's top-left cell
/// * `rows` - Cell rows; `None` leaves the existing cell untouched
/// * `mode` - Replace or overlay semantics for an existing sheet
pub fn write_range<R>(
    path: &Path,
    sheet_name: &str,
    origin: (usize, usize),
    rows: &[R],
    mode: WriteMode,
) -> Result<(), VolumeSheetError>
where
    R: AsRef<[Option<CellValue>]>,
{
    let mut workbook = if path.exists() {
        Workbook::open(path)?
    } else {
        debug!("Creating workbook {}", path.display());
        Workbook::default()
    };
    workbook.sheet_for_write(sheet_name, mode)?.write_rows(origin, rows);
    workbook.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<Option<CellValue>> {
        values.iter().map(|value| Some(CellValue::text(*value))).collect()
    }

    #[test]
    fn replace_keeps_position_and_clears() {
        let mut workbook = Workbook::default();
        workbook.sheet_for_write("data_0", WriteMode::Replace).unwrap().write_rows((0, 0), &[row(&["a", "b"])]);
        workbook.sheet_for_write("data_1", WriteMode::Replace).unwrap().write_rows((0, 0), &[row(&["c"])]);
        workbook.sheet_for_write("data_0", WriteMode::Replace).unwrap().write_rows((1, 0), &[row(&["d"])]);

        assert_eq!(workbook.sheet_names(), vec!["data_0", "data_1"]);
        let sheet = workbook.sheet("data_0").unwrap();
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.get(1, 0), Some(&CellValue::text("d")));
    }

    #[test]
    fn overlay_merges() {
        let mut workbook = Workbook::default();
        workbook.sheet_for_write("data_0", WriteMode::Replace).unwrap().write_rows((0, 0), &[row(&["a"])]);
        workbook.sheet_for_write("data_0", WriteMode::Overlay).unwrap().write_rows((2, 0), &[row(&["b"])]);
        assert_eq!(workbook.sheet("DATA_0").unwrap().len(), 2);
    }

    #[test]
    fn sheet_names_are_validated() {
        let mut workbook = Workbook::default();
        assert!(workbook.sheet_for_write("a/b", WriteMode::Overlay).is_err());
        assert!(workbook.sheet_for_write("", WriteMode::Overlay).is_err());
        assert!(workbook.sheet_for_write(&"x".repeat(32), WriteMode::Overlay).is_err());
    }
}
