use crate::spreadsheet::cell::CellValue;
use std::collections::BTreeMap;

/// A named worksheet holding sparse cell content keyed by 0-based (row, column).
#[derive(Clone, Debug, PartialEq)]
pub struct Sheet {
    /// Sheet name as shown on the tab
    pub name: String,
    /// Cells in row-major order
    cells: BTreeMap<(usize, usize), CellValue>,
}

impl Sheet {
    /// Creates an empty sheet.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: BTreeMap::new(),
        }
    }

    /// Returns true if the sheet contains no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of non-empty cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Removes every cell, keeping the sheet itself.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Returns the cell at (row, col).
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Sets the cell at (row, col), replacing previous content.
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) {
        self.cells.insert((row, col), value);
    }

    /// Writes a rectangular block of rows with its top-left corner at `origin`.
    /// `None` entries leave the underlying cell untouched.
    pub fn write_rows<R>(&mut self, origin: (usize, usize), rows: &[R])
    where
        R: AsRef<[Option<CellValue>]>,
    {
        let (row_origin, col_origin) = origin;
        for (row_offset, row) in rows.iter().enumerate() {
            for (col_offset, value) in row.as_ref().iter().enumerate() {
                if let Some(value) = value {
                    self.set(row_origin + row_offset, col_origin + col_offset, value.clone());
                }
            }
        }
    }

    /// Iterates cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &CellValue)> {
        self.cells.iter().map(|((row, col), value)| (*row, *col, value))
    }

    /// Returns the cells grouped by row, in order.
    pub(crate) fn rows(&self) -> Vec<(usize, Vec<(usize, &CellValue)>)> {
        let mut rows = Vec::<(usize, Vec<(usize, &CellValue)>)>::new();
        for (row, col, value) in self.cells() {
            match rows.last_mut() {
                Some((last_row, cells)) if *last_row == row => cells.push((col, value)),
                _ => rows.push((row, vec![(col, value)])),
            }
        }
        rows
    }

    /// Smallest rectangle covering all cells as ((row, col), (row, col)), if any.
    pub fn dimension(&self) -> Option<((usize, usize), (usize, usize))> {
        let (first_row, _) = self.cells.keys().next()?;
        let (last_row, _) = self.cells.keys().next_back()?;
        let first_col = self.cells.keys().map(|(_, col)| *col).min()?;
        let last_col = self.cells.keys().map(|(_, col)| *col).max()?;
        Some(((*first_row, first_col), (*last_row, last_col)))
    }
}
