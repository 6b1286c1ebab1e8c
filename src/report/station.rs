//! Chainage parsing and station/area records.
//!
//! A chainage such as `12+500` is read by removing the `+` separator and
//! parsing the remaining digits, so `12+500` is station 12500 and `0+020.50`
//! is station 20.5. Anything that is not `[sign]<digits>+<digits>[.<digits>]`
//! is rejected.

use crate::report::ReportError;
use crate::source::RawTable;
use crate::spreadsheet::CellValue;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Table rows before the first station: column names and units.
pub const LEADING_ROWS: usize = 2;

#[derive(Error, Debug, PartialEq)]
pub enum StationError {
    #[error("Invalid chainage '{0}', expected <km>+<m>")]
    FormatError(String),

    #[error("Invalid number '{0}'")]
    NumberError(String),
}

fn chainage_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([+-]?)(\d+)\+(\d+(?:\.\d+)?)$").expect("Hardcode regex pattern"))
}

/// Parses chainage notation into a station value.
pub fn parse_station(text: &str) -> Result<f64, StationError> {
    let text = text.trim();
    let captures = chainage_pattern()
        .captures(text)
        .ok_or_else(|| StationError::FormatError(text.to_owned()))?;
    let digits = format!("{}{}{}", &captures[1], &captures[2], &captures[3]);
    digits
        .parse::<f64>()
        .map_err(|_| StationError::NumberError(text.to_owned()))
}

/// Parses an area cell; `,` thousands separators are ignored.
pub fn parse_area(text: &str) -> Result<f64, StationError> {
    let cleaned = text.trim().replace(',', "");
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| StationError::NumberError(text.trim().to_owned()))
}

/// One surveyed cross-section.
#[derive(Clone, Debug, PartialEq)]
pub struct StationRecord {
    pub station: f64,
    pub area: f64,
    /// Cells of the configured columns between the station and area columns
    pub extra: Vec<CellValue>,
}

/// Positions of the configured columns within the station table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSelection {
    pub station: usize,
    pub extra: Vec<usize>,
    pub area: usize,
}

impl ColumnSelection {
    /// Looks up the configured names (station first, area last) in the
    /// table's column names.
    pub fn resolve(column_names: &[String], names: &[String]) -> Result<Self, ReportError> {
        let find = |name: &String| {
            let wanted = normalize(name);
            column_names
                .iter()
                .position(|column| normalize(column) == wanted)
                .ok_or_else(|| ReportError::MissingColumnError(name.to_owned()))
        };
        let indexes = names.iter().map(find).collect::<Result<Vec<_>, _>>()?;
        match indexes.as_slice() {
            [station, extra @ .., area] => Ok(ColumnSelection {
                station: *station,
                extra: extra.to_vec(),
                area: *area,
            }),
            _ => Err(ReportError::ColumnCountError(names.len())),
        }
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reads the station records of a station table.
///
/// Row 0 of the table holds the column names and row 1 the units; both are
/// skipped. Errors report the 0-based table row.
pub fn read_records(table: &RawTable, names: &[String]) -> Result<Vec<StationRecord>, ReportError> {
    if table.len() < LEADING_ROWS {
        return Err(ReportError::TooFewRowsError {
            expected: LEADING_ROWS,
            found: table.len(),
        });
    }
    let columns = ColumnSelection::resolve(&table.rows()[0], names)?;

    let mut records = Vec::with_capacity(table.len() - LEADING_ROWS);
    for (row, cells) in table.rows().iter().enumerate().skip(LEADING_ROWS) {
        let cell = |col: usize| cells.get(col).map(String::as_str).unwrap_or_default();

        let station_text = cell(columns.station);
        if station_text.trim().is_empty() {
            return Err(ReportError::EmptyStation { row });
        }
        let station = parse_station(station_text).map_err(|source| ReportError::StationError { row, source })?;
        let area = parse_area(cell(columns.area)).map_err(|source| ReportError::StationError { row, source })?;
        let extra = columns
            .extra
            .iter()
            .map(|col| {
                let text = cell(*col);
                match parse_area(text) {
                    Ok(number) => CellValue::Number(number),
                    Err(_) => CellValue::text(text),
                }
            })
            .collect();
        records.push(StationRecord { station, area, extra });
    }
    Ok(records)
}
