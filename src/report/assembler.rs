//! Places report sheets into the output workbook.
//!
//! Row arithmetic follows the order header height, first data row, volume
//! formulas, summary row. The first data row `S` (1-based) is derived from
//! the gap settings:
//!
//! ```text
//! S = gapRowsBeforeProjectData + 5 + gapRowsBeforeVolumeData + 1
//! ```
//!
//! and the summary formula sums the volume column from `S` to
//! `S + N - gapRowsBeforeSumVolumeData`, which must be one of the data rows. The blocks themselves are written at
//! `startRowForProjectData` and `startRowForVolumeData`; settings where these
//! disagree with `S` produce formulas pointing at other rows, which is logged.

use crate::config::Settings;
use crate::error::VolumeSheetError;
use crate::report::header::HEADER_HEIGHT;
use crate::report::station::StationRecord;
use crate::report::volume::FormulaColumns;
use crate::report::volume::VolumeColumnSet;
use crate::report::ReportError;
use crate::report::ReportSheet;
use crate::spreadsheet::write_range;
use crate::spreadsheet::CellValue;
use crate::spreadsheet::WriteMode;
use log::info;
use log::warn;
use std::path::Path;

/// Header rows of the volume table (the column names).
pub const VOLUME_HEADER_ROWS: usize = 1;

/// Placeholder written to summary cells without a value.
pub const SUMMARY_PLACEHOLDER: &str = "-";

/// Name of the n-th sheet of the output workbook.
pub fn sheet_name(index: usize) -> String {
    format!("data_{index}")
}

/// Row and column positions shared by the cut and fill sheets of one export.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    /// 1-based row of the first station referenced by the formulas
    pub first_row: usize,
    /// 1-based last row of the summary range, when a summary row is written
    pub sum_end: Option<usize>,
    /// Sheet columns of the volume table
    pub columns: FormulaColumns,
}

impl Layout {
    /// Computes the layout for `count` station records.
    pub fn compute(settings: &Settings, count: usize) -> Result<Self, ReportError> {
        let first_row = settings.gap_rows_before_project_data
            + HEADER_HEIGHT
            + settings.gap_rows_before_volume_data
            + VOLUME_HEADER_ROWS;

        let written_row = settings.start_row_for_volume_data + VOLUME_HEADER_ROWS + 1;
        if first_row != written_row {
            warn!(
                "Volume formulas start on row {first_row} but the first station is written to row {written_row}; \
                 check the gap settings against startRowForVolumeData"
            );
        }

        let sum_end = if settings.include_sum_row && count > 0 {
            let end = (first_row + count)
                .checked_sub(settings.gap_rows_before_sum_volume_data)
                .filter(|end| (first_row..first_row + count).contains(end))
                .ok_or(ReportError::LayoutError {
                    first_row,
                    count,
                    gap: settings.gap_rows_before_sum_volume_data,
                })?;
            Some(end)
        } else {
            None
        };

        let extra_columns = settings.columns_for_cut.len().saturating_sub(2);
        let station = settings.start_column_for_volume_data;
        let area = station + extra_columns + 1;
        let columns = FormulaColumns {
            station,
            area,
            distance: area + 1,
            volume: area + 2,
            cumulative: area + 3,
        };

        Ok(Layout {
            first_row,
            sum_end,
            columns,
        })
    }
}

/// Column names, station rows joined with the volume columns, and the
/// optional summary row of one sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct DataBlock {
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub summary: Option<Vec<CellValue>>,
}

impl DataBlock {
    /// Joins the configured columns of the records with their volume columns.
    pub fn new(
        settings: &Settings,
        names: &[String],
        records: &[StationRecord],
        volumes: VolumeColumnSet,
        layout: &Layout,
    ) -> Self {
        let mut column_names = names.to_vec();
        column_names.push(settings.distance_header.clone());
        column_names.push(settings.volume_header.clone());
        column_names.push(settings.acum_volume_header.clone());

        let summary = settings.include_sum_row.then(|| {
            let width = column_names.len();
            let mut row = vec![CellValue::text(SUMMARY_PLACEHOLDER); width];
            let end = layout.sum_end.unwrap_or(layout.first_row);
            row[width - 2] = volumes.sum_cell(settings.volume_mode, layout.columns.volume, layout.first_row, end);
            if let Some(label) = &settings.sum_label {
                row[width - 3] = CellValue::text(label.as_str());
            }
            row
        });

        let VolumeColumnSet {
            distance,
            volume,
            cumulative,
        } = volumes;
        let rows = records
            .iter()
            .zip(distance)
            .zip(volume)
            .zip(cumulative)
            .map(|(((record, distance), volume), cumulative)| {
                let mut row = Vec::with_capacity(column_names.len());
                row.push(CellValue::Number(record.station));
                row.extend(record.extra.iter().cloned());
                row.push(CellValue::Number(record.area));
                row.push(distance);
                row.push(volume);
                row.push(cumulative);
                row
            })
            .collect();

        DataBlock {
            column_names,
            rows,
            summary,
        }
    }

    /// Cell rows as written to the sheet: column names, stations, summary.
    pub fn to_rows(&self) -> Vec<Vec<Option<CellValue>>> {
        let names: Vec<Option<CellValue>> = self.column_names.iter().map(|name| Some(CellValue::text(name.as_str()))).collect();
        let body = self.rows.iter().chain(self.summary.as_ref());
        std::iter::once(names)
            .chain(body.map(|row| row.iter().cloned().map(Some).collect()))
            .collect()
    }
}

/// Writes one report sheet as `data_{index}`.
///
/// The header replaces any existing content of the sheet; the data block is
/// then overlaid at its own offset.
pub fn write_report(path: &Path, index: usize, report: &ReportSheet, settings: &Settings) -> Result<(), VolumeSheetError> {
    let name = sheet_name(index);
    let header_rows = report
        .header
        .lines()
        .iter()
        .map(|line| vec![Some(CellValue::text(*line))])
        .collect::<Vec<_>>();
    write_range(
        path,
        &name,
        (settings.start_row_for_project_data, settings.start_column_for_project_data),
        &header_rows,
        WriteMode::Replace,
    )?;
    write_range(
        path,
        &name,
        (settings.start_row_for_volume_data, settings.start_column_for_volume_data),
        &report.block.to_rows(),
        WriteMode::Overlay,
    )?;
    info!("Wrote sheet {name} ({} stations)", report.block.rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample;
    use crate::config::VolumeMode;
    use crate::report::build_reports;
    use crate::report::tests::survey;
    use crate::report::volume::tests::Evaluator;
    use crate::spreadsheet::Workbook;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn reports(settings: &Settings) -> [ReportSheet; 2] {
        build_reports(&survey(), settings, NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()).unwrap()
    }

    #[test]
    fn default_layout() {
        let layout = Layout::compute(&sample(), 3).unwrap();
        assert_eq!(layout.first_row, 8);
        assert_eq!(layout.sum_end, Some(10));
        assert_eq!(
            layout.columns,
            FormulaColumns {
                station: 0,
                area: 1,
                distance: 2,
                volume: 3,
                cumulative: 4,
            }
        );
    }

    #[test]
    fn shifted_layout() {
        let mut settings = sample();
        settings.start_column_for_volume_data = 2;
        settings.columns_for_cut = vec!["Station".into(), "Offset".into(), "Cut Area (Sq.m.)".into()];
        settings.columns_for_fill = vec!["Station".into(), "Offset".into(), "Fill Area (Sq.m.)".into()];
        settings.gap_rows_before_project_data = 0;
        settings.include_sum_row = false;
        let layout = Layout::compute(&settings, 3).unwrap();
        assert_eq!(layout.first_row, 7);
        assert_eq!(layout.sum_end, None);
        assert_eq!(layout.columns.station, 2);
        assert_eq!(layout.columns.area, 4);
        assert_eq!(layout.columns.cumulative, 7);
    }

    #[test]
    fn summary_range_before_first_row_fails() {
        let mut settings = sample();
        settings.gap_rows_before_sum_volume_data = 20;
        assert!(matches!(
            Layout::compute(&settings, 3),
            Err(ReportError::LayoutError { first_row: 8, count: 3, gap: 20 })
        ));
        settings.include_sum_row = false;
        assert!(Layout::compute(&settings, 3).is_ok());
    }

    #[test]
    fn summary_range_outside_data_rows_fails() {
        let mut settings = sample();
        settings.gap_rows_before_sum_volume_data = 0;
        assert!(matches!(
            Layout::compute(&settings, 3),
            Err(ReportError::LayoutError { first_row: 8, count: 3, gap: 0 })
        ));

        settings.gap_rows_before_sum_volume_data = 4;
        assert!(matches!(
            Layout::compute(&settings, 3),
            Err(ReportError::LayoutError { first_row: 8, count: 3, gap: 4 })
        ));

        settings.gap_rows_before_sum_volume_data = 3;
        assert_eq!(Layout::compute(&settings, 3).unwrap().sum_end, Some(8));
    }

    /// Evaluates the summary cell of a block written at its configured offset.
    fn evaluated_sum(report: &ReportSheet, settings: &Settings) -> f64 {
        let mut cells = HashMap::new();
        for (i, row) in report.block.to_rows().into_iter().enumerate() {
            for (j, value) in row.into_iter().enumerate() {
                if let Some(value) = value {
                    cells.insert(
                        (settings.start_row_for_volume_data + i, settings.start_column_for_volume_data + j),
                        value,
                    );
                }
            }
        }
        let summary = report.block.summary.as_ref().unwrap();
        let evaluator = Evaluator { cells: &cells };
        match &summary[summary.len() - 2] {
            CellValue::Formula(formula) => evaluator.eval(formula),
            CellValue::Number(number) => *number,
            other => panic!("unexpected summary cell {other:?}"),
        }
    }

    #[test]
    fn summary_agrees_across_modes() {
        for (gap, expected) in [(1, 220.0), (2, 60.0), (3, 0.0)] {
            let mut settings = sample();
            settings.gap_rows_before_sum_volume_data = gap;
            let [formulas, _] = reports(&settings);
            settings.volume_mode = VolumeMode::Values;
            let [values, _] = reports(&settings);
            assert_eq!(evaluated_sum(&formulas, &settings), expected, "gap {gap}");
            assert_eq!(evaluated_sum(&values, &settings), expected, "gap {gap}");
        }
    }

    #[test]
    fn mismatched_start_row_still_builds() {
        let mut settings = sample();
        settings.start_row_for_volume_data = 10;
        let layout = Layout::compute(&settings, 3).unwrap();
        assert_eq!(layout.first_row, 8);

        let dir = tempdir().unwrap();
        let path = dir.path().join("output.xlsx");
        let [cut, _] = reports(&settings);
        write_report(&path, 0, &cut, &settings).unwrap();
        let workbook = Workbook::open(&path).unwrap();
        let sheet = workbook.sheet("data_0").unwrap();
        assert_eq!(sheet.get(10, 0), Some(&CellValue::text("Station")));
        assert_eq!(sheet.get(12, 2), Some(&CellValue::formula("(A9-A8)/2")));
        assert_eq!(sheet.get(14, 3), Some(&CellValue::formula("SUM(D8:D10)")));
    }

    #[test]
    fn summary_row() {
        let mut settings = sample();
        let [cut, _] = reports(&settings);
        assert_eq!(
            cut.block.summary,
            Some(vec![
                CellValue::text("-"),
                CellValue::text("-"),
                CellValue::text("-"),
                CellValue::formula("SUM(D8:D10)"),
                CellValue::text("-"),
            ])
        );

        settings.sum_label = Some("SUMA".to_owned());
        settings.volume_mode = VolumeMode::Values;
        let [cut, _] = reports(&settings);
        let summary = cut.block.summary.unwrap();
        assert_eq!(summary[2], CellValue::text("SUMA"));
        assert_eq!(summary[3], CellValue::Number(220.0));

        settings.include_sum_row = false;
        let [cut, _] = reports(&settings);
        assert_eq!(cut.block.summary, None);
        assert_eq!(cut.block.to_rows().len(), 4);
    }

    #[test]
    fn block_rows() {
        let [cut, _] = reports(&sample());
        let rows = cut.block.to_rows();
        assert_eq!(rows.len(), 5);
        assert_eq!(
            rows[0],
            vec![
                Some(CellValue::text("Station")),
                Some(CellValue::text("Cut Area (Sq.m.)")),
                Some(CellValue::text("Distancia/2 (m)")),
                Some(CellValue::text("Volumen (m3)")),
                Some(CellValue::text("Vol. Acumulado (m3)")),
            ]
        );
        assert_eq!(rows[2][0], Some(CellValue::Number(10.0)));
        assert_eq!(rows[2][2], Some(CellValue::formula("(A9-A8)/2")));
    }

    #[test]
    fn sheets_are_written_and_replaced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.xlsx");
        let settings = sample();
        let [cut, fill] = reports(&settings);
        write_report(&path, 0, &cut, &settings).unwrap();
        write_report(&path, 1, &fill, &settings).unwrap();

        let workbook = Workbook::open(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["data_0", "data_1"]);
        let sheet = workbook.sheet("data_0").unwrap();
        assert_eq!(sheet.get(0, 0), Some(&CellValue::text("PROYECTO CAMINO VECINAL")));
        assert_eq!(sheet.get(3, 0), Some(&CellValue::text("DEL KM 0+000 AL KM 0+030")));
        assert_eq!(sheet.get(6, 1), Some(&CellValue::text("Cut Area (Sq.m.)")));
        assert_eq!(sheet.get(7, 3), Some(&CellValue::Number(0.0)));
        assert_eq!(sheet.get(9, 4), Some(&CellValue::formula("D10+E9")));
        assert_eq!(sheet.get(10, 3), Some(&CellValue::formula("SUM(D8:D10)")));

        // Rewriting the first sheet with a shorter block leaves no stale cells
        let mut settings = settings;
        settings.include_sum_row = false;
        let [cut, _] = reports(&settings);
        write_report(&path, 0, &cut, &settings).unwrap();
        let workbook = Workbook::open(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["data_0", "data_1"]);
        assert_eq!(workbook.sheet("data_0").unwrap().get(10, 3), None);
        assert_eq!(workbook.sheet("data_1").unwrap().get(10, 3), Some(&CellValue::formula("SUM(D8:D10)")));
    }
}
