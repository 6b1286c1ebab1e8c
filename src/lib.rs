//! # Volume Sheet
//!
//! Builds earthworks cut/fill volume reports from the HTML cross-section
//! exports of road design software and writes them into one XLSX workbook.
//!
//! ## Features
//!
//! - **HTML input**: every `.htm`/`.html` file of a directory, read in file name order;
//!   each holds a project metadata table and a station/area table
//! - **Trapezoidal volumes**: half distance, incremental volume and cumulative volume
//!   per station interval
//! - **Live formulas**: volume columns written as formulas referencing the station and
//!   area cells, or as computed values
//! - **Configurable layout**: header and table offsets, gap rows and an optional
//!   summary row, loaded from a JSON settings file
//! - **Workbook amendment**: sheets `data_0`, `data_1`, … are replaced in an existing
//!   `output.xlsx` while other sheets are kept
//!
//! ## Output
//!
//! Every input file contributes two sheets: the cut report followed by the fill
//! report. Each sheet holds the five project header lines and the volume table.
use chrono::Local;
use chrono::NaiveDate;
use log::info;
use std::path::Path;
use std::path::PathBuf;

pub mod config;
pub mod error;
mod helpers;
pub mod report;
pub mod source;
pub mod spreadsheet;

use crate::config::Settings;
use crate::error::ResultMessage;
pub use crate::error::VolumeSheetError;
use crate::report::assembler::sheet_name;
use crate::report::assembler::write_report;
use crate::report::ReportSheet;

/// Default output workbook name, created inside the input directory.
pub const DEFAULT_OUTPUT_FILE: &str = "output.xlsx";

/// Outcome of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Workbook written
    pub output: PathBuf,
    /// Input files processed
    pub files: Vec<PathBuf>,
    /// Sheets written, in order
    pub sheets: Vec<String>,
}

/// Processes every HTML export of `directory` and writes the reports into
/// `directory/output_name`, dated today.
pub fn run(settings: &Settings, directory: &Path, output_name: &str) -> Result<RunSummary, VolumeSheetError> {
    run_with_date(settings, directory, output_name, Local::now().date_naive())
}

/// Same as [`run`] with an explicit report date.
///
/// All input files are read and all report sheets built before the first
/// write, so a malformed input leaves the output workbook untouched.
pub fn run_with_date(
    settings: &Settings,
    directory: &Path,
    output_name: &str,
    date: NaiveDate,
) -> Result<RunSummary, VolumeSheetError> {
    let files = source::list_sources(directory)?;
    info!("Found {} HTML files in {}", files.len(), directory.display());

    let mut reports: Vec<ReportSheet> = Vec::with_capacity(files.len() * 2);
    for path in &files {
        let context = path.display().to_string();
        let survey = source::read_survey(path)
            .map_err(VolumeSheetError::from)
            .with_prefix(&context)?;
        let [cut, fill] = report::build_reports(&survey, settings, date)
            .map_err(VolumeSheetError::from)
            .with_prefix(&context)?;
        info!("Processed {} ({} stations)", context, cut.block.rows.len());
        reports.push(cut);
        reports.push(fill);
    }

    let output = directory.join(output_name);
    let context = output.display().to_string();
    let mut sheets = Vec::with_capacity(reports.len());
    for (index, report) in reports.iter().enumerate() {
        write_report(&output, index, report, settings).with_prefix(&context)?;
        sheets.push(sheet_name(index));
    }

    Ok(RunSummary { output, files, sheets })
}
