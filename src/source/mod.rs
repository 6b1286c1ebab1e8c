//! # Source Module
//!
//! Locates the HTML survey exports of a directory and extracts their tables.
//! Each export holds a project metadata table followed by the station/area
//! table; any further tables are ignored.
use crate::error::VolumeSheetError;
use log::debug;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

pub(crate) mod criteria;
pub(crate) mod html;

use criteria::Criteria;
use criteria::SOURCE_PATTERNS;

/// Number of tables a survey export must contain.
pub const REQUIRED_TABLES: usize = 2;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Cannot read directory '{path}': {source}")]
    DirectoryError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot read file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Expected at least {expected} tables, found {found}")]
    MissingTableError { expected: usize, found: usize },
}

impl SourceError {
    /// True when the failure comes from the filesystem rather than the content.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::DirectoryError { .. } | Self::ReadError { .. })
    }
}

/// One HTML table as rows of cell text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawTable {
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        RawTable { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text at 0-based (row, column), `None` when the row is too short.
    #[cfg(test)]
    pub(crate) fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<Vec<S>> for RawTable {
    fn from_iter<I: IntoIterator<Item = Vec<S>>>(iter: I) -> Self {
        RawTable::new(
            iter.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }
}

/// The two tables of one survey export.
#[derive(Clone, Debug, PartialEq)]
pub struct SurveyTables {
    /// Project metadata, one text field per row in the first column.
    pub metadata: RawTable,
    /// Column names, a units row, then one row per station.
    pub stations: RawTable,
}

impl SurveyTables {
    /// Takes the first two tables of a document.
    pub fn from_tables(tables: Vec<RawTable>) -> Result<Self, SourceError> {
        let found = tables.len();
        let mut tables = tables.into_iter();
        match (tables.next(), tables.next()) {
            (Some(metadata), Some(stations)) => Ok(SurveyTables { metadata, stations }),
            _ => Err(SourceError::MissingTableError {
                expected: REQUIRED_TABLES,
                found,
            }),
        }
    }
}

/// Lists the HTML exports of a directory, sorted by file name.
///
/// Only regular files whose name matches `*.htm` or `*.html` (any case) are
/// returned; subdirectories are not searched.
pub fn list_sources(directory: &Path) -> Result<Vec<PathBuf>, VolumeSheetError> {
    let criteria = Criteria::new(&SOURCE_PATTERNS)?;
    let entries = fs::read_dir(directory).map_err(|source| SourceError::DirectoryError {
        path: directory.to_owned(),
        source,
    })?;

    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SourceError::DirectoryError {
            path: directory.to_owned(),
            source,
        })?;
        let path = entry.path();
        let accepted = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| criteria.accept(name));
        if accepted && path.is_file() {
            sources.push(path);
        }
    }
    sources.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(sources)
}

/// Reads an HTML export and returns its metadata and station tables.
pub fn read_survey(path: &Path) -> Result<SurveyTables, SourceError> {
    let bytes = fs::read(path).map_err(|source| SourceError::ReadError {
        path: path.to_owned(),
        source,
    })?;
    let tables = html::extract_tables(&html::decode_html(&bytes));
    debug!(
        "{}: {} tables, shapes {:?}",
        path.display(),
        tables.len(),
        tables.iter().map(RawTable::len).collect::<Vec<_>>()
    );
    SurveyTables::from_tables(tables)
}
