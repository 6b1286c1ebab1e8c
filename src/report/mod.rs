//! # Report Module
//!
//! Turns the tables of one survey export into a cut and a fill report sheet:
//!
//! - [`header`]: the five project header lines
//! - [`station`]: chainage parsing and station/area records
//! - [`volume`]: distance, volume and cumulative volume columns
//! - [`assembler`]: spreadsheet layout and writing
use crate::config::Settings;
use crate::config::VolumeMode;
use crate::source::SurveyTables;
use chrono::NaiveDate;
use log::debug;
use thiserror::Error;

pub mod assembler;
pub mod header;
pub mod station;
pub mod volume;

use assembler::DataBlock;
use assembler::Layout;
use header::HeaderError;
use header::MetadataLayout;
use header::ProjectHeader;
use station::StationError;
use volume::VolumeColumnSet;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    HeaderError(#[from] HeaderError),

    #[error("Station table row {row}: {source}")]
    StationError { row: usize, source: StationError },

    #[error("Station table row {row} has no station")]
    EmptyStation { row: usize },

    #[error("Column '{0}' not found in station table")]
    MissingColumnError(String),

    #[error("Expected a station and an area column, got {0} columns")]
    ColumnCountError(usize),

    #[error("Station table needs at least {expected} rows, found {found}")]
    TooFewRowsError { expected: usize, found: usize },

    #[error("Summary range must end within the data rows: first row {first_row}, {count} rows, {gap} gap rows before the sum")]
    LayoutError {
        first_row: usize,
        count: usize,
        gap: usize,
    },
}

impl ReportError {
    /// True when the failure comes from the layout settings rather than the input.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::LayoutError { .. })
    }
}

/// Header and data block destined for one sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportSheet {
    pub header: ProjectHeader,
    pub block: DataBlock,
}

/// Builds the cut and fill report sheets of one survey export.
pub fn build_reports(survey: &SurveyTables, settings: &Settings, date: NaiveDate) -> Result<[ReportSheet; 2], ReportError> {
    let (cut_header, fill_header) = header::build_headers(&survey.metadata, &MetadataLayout::default(), settings, date)?;
    let cut_records = station::read_records(&survey.stations, &settings.columns_for_cut)?;
    let fill_records = station::read_records(&survey.stations, &settings.columns_for_fill)?;

    let layout = Layout::compute(settings, cut_records.len())?;
    debug!("{} stations, {layout:?}", cut_records.len());

    let (cut_volumes, fill_volumes) = match settings.volume_mode {
        VolumeMode::Formulas => {
            let volumes = VolumeColumnSet::formulas(cut_records.len(), layout.first_row, &layout.columns);
            (volumes.clone(), volumes)
        }
        VolumeMode::Values => (
            VolumeColumnSet::values(&cut_records),
            VolumeColumnSet::values(&fill_records),
        ),
    };

    let cut = ReportSheet {
        header: cut_header,
        block: DataBlock::new(settings, &settings.columns_for_cut, &cut_records, cut_volumes, &layout),
    };
    let fill = ReportSheet {
        header: fill_header,
        block: DataBlock::new(settings, &settings.columns_for_fill, &fill_records, fill_volumes, &layout),
    };
    Ok([cut, fill])
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::tests::sample;
    use crate::source::RawTable;
    use crate::spreadsheet::CellValue;

    pub(crate) fn survey() -> SurveyTables {
        SurveyTables {
            metadata: [
                vec!["PROYECTO CAMINO VECINAL"],
                vec!["CARRETERA: RUTA 5"],
                vec!["TRAMO: NORTE"],
                vec!["ESTACION DE: 0+000"],
                vec!["HASTA KM: 0+030"],
            ]
            .into_iter()
            .collect(),
            stations: [
                vec!["Station", "Cut Area (Sq.m.)", "Fill Area (Sq.m.)"],
                vec!["", "(Sq.m.)", "(Sq.m.)"],
                vec!["0+000", "5", "1"],
                vec!["0+010", "7", "0"],
                vec!["0+030", "9", "2"],
            ]
            .into_iter()
            .collect::<RawTable>(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn formula_mode_shares_volume_columns() {
        let [cut, fill] = build_reports(&survey(), &sample(), date()).unwrap();
        assert_eq!(cut.header.volume_title, "VOLUMEN DE CORTE");
        assert_eq!(fill.header.volume_title, "VOLUMEN DE RELLENO");
        assert_eq!(cut.block.rows[1][2..], fill.block.rows[1][2..]);
        assert_eq!(cut.block.rows[1][1], CellValue::Number(7.0));
        assert_eq!(fill.block.rows[1][1], CellValue::Number(0.0));
        assert_eq!(cut.block.rows[2][3].as_formula(), Some("(B10+B9)*(C10)"));
    }

    #[test]
    fn values_mode_computes_each_sheet() {
        let mut settings = sample();
        settings.volume_mode = VolumeMode::Values;
        let [cut, fill] = build_reports(&survey(), &settings, date()).unwrap();
        assert_eq!(cut.block.rows[2][4], CellValue::Number(220.0));
        assert_eq!(fill.block.rows[2][4], CellValue::Number(25.0));
        assert_eq!(cut.block.rows[2][2], fill.block.rows[2][2]);
    }

    #[test]
    fn malformed_metadata_aborts() {
        let mut survey = survey();
        survey.metadata = [vec!["PROYECTO"], vec!["CARRETERA"]].into_iter().collect();
        assert!(matches!(
            build_reports(&survey, &sample(), date()),
            Err(ReportError::HeaderError(HeaderError::ShortText { row: 1, .. }))
        ));
    }
}
