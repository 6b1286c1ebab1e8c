//! Project header lines derived from the metadata table.

use crate::config::Settings;
use crate::source::RawTable;
use chrono::NaiveDate;
use thiserror::Error;

/// Number of lines of a [`ProjectHeader`].
pub const HEADER_HEIGHT: usize = 5;

#[derive(Error, Debug, PartialEq)]
pub enum HeaderError {
    #[error("Metadata table has no row {row}")]
    MissingRow { row: usize },

    #[error("Metadata row {row} has no cells")]
    MissingCell { row: usize },

    #[error("Metadata row {row} '{text}' is shorter than its {prefix_len}-character label")]
    ShortText {
        row: usize,
        prefix_len: usize,
        text: String,
    },

    #[error("Metadata row {row} has no value after its {prefix_len}-character label")]
    EmptyValue { row: usize, prefix_len: usize },
}

/// A value stored after a fixed-length label in the first column of a
/// metadata row, e.g. `CARRETERA: RUTA 5`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LabeledField {
    /// 0-based row of the metadata table
    pub row: usize,
    /// Label length in characters
    pub prefix_len: usize,
}

impl LabeledField {
    pub const fn new(row: usize, prefix_len: usize) -> Self {
        LabeledField { row, prefix_len }
    }

    /// Returns the text following the label, trimmed and without a leading `:`.
    pub fn extract(&self, table: &RawTable) -> Result<String, HeaderError> {
        let row = table
            .rows()
            .get(self.row)
            .ok_or(HeaderError::MissingRow { row: self.row })?;
        let text = row.first().ok_or(HeaderError::MissingCell { row: self.row })?;
        if text.chars().count() < self.prefix_len {
            return Err(HeaderError::ShortText {
                row: self.row,
                prefix_len: self.prefix_len,
                text: text.to_owned(),
            });
        }
        let value = text.chars().skip(self.prefix_len).collect::<String>();
        // A label one character longer than its prefix leaves the separator behind
        let value = value.trim().trim_start_matches(':').trim_start();
        if value.is_empty() {
            return Err(HeaderError::EmptyValue {
                row: self.row,
                prefix_len: self.prefix_len,
            });
        }
        Ok(value.to_owned())
    }
}

/// Positions of the fields read from the metadata table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MetadataLayout {
    pub road: LabeledField,
    pub start_station: LabeledField,
    pub end_station: LabeledField,
}

impl Default for MetadataLayout {
    /// `CARRETERA:` on row 1, `ESTACION DE:` on row 3, `HASTA KM:` on row 4.
    fn default() -> Self {
        MetadataLayout {
            road: LabeledField::new(1, 10),
            start_station: LabeledField::new(3, 11),
            end_station: LabeledField::new(4, 9),
        }
    }
}

/// The five header lines written above a volume table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectHeader {
    pub project_title: String,
    pub road: String,
    pub volume_title: String,
    pub station_range: String,
    pub date: String,
}

impl ProjectHeader {
    /// Header lines top to bottom.
    pub fn lines(&self) -> [&str; HEADER_HEIGHT] {
        [
            self.project_title.as_str(),
            self.road.as_str(),
            self.volume_title.as_str(),
            self.station_range.as_str(),
            self.date.as_str(),
        ]
    }
}

/// Builds the cut and fill headers of one survey export.
///
/// Both headers carry the same lines except the volume title.
pub fn build_headers(
    metadata: &RawTable,
    layout: &MetadataLayout,
    settings: &Settings,
    date: NaiveDate,
) -> Result<(ProjectHeader, ProjectHeader), HeaderError> {
    let road = layout.road.extract(metadata)?;
    let start = layout.start_station.extract(metadata)?;
    let end = layout.end_station.extract(metadata)?;

    let cut = ProjectHeader {
        project_title: settings.project_title.clone(),
        road,
        volume_title: settings.cut_volume_title.clone(),
        station_range: settings
            .station_range_format
            .replace("{start}", &start)
            .replace("{end}", &end),
        date: date.format("%Y-%m-%d").to_string(),
    };
    let fill = ProjectHeader {
        volume_title: settings.fill_volume_title.clone(),
        ..cut.clone()
    };
    Ok((cut, fill))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample;

    fn metadata() -> RawTable {
        [
            vec!["PROYECTO CAMINO VECINAL"],
            vec!["CARRETERA: RUTA 5"],
            vec!["TRAMO: NORTE"],
            vec!["ESTACION DE: 0+000"],
            vec!["HASTA KM: 10+500"],
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn fields_after_fixed_labels() {
        let layout = MetadataLayout::default();
        let table = metadata();
        assert_eq!(layout.road.extract(&table).unwrap(), "RUTA 5");
        assert_eq!(layout.start_station.extract(&table).unwrap(), "0+000");
        assert_eq!(layout.end_station.extract(&table).unwrap(), "10+500");
    }

    #[test]
    fn labels_are_counted_in_characters() {
        let table: RawTable = [vec!["x"], vec!["TRAMO ÑU: Río Claro"]].into_iter().collect();
        assert_eq!(LabeledField::new(1, 10).extract(&table).unwrap(), "Río Claro");
    }

    #[test]
    fn malformed_rows_fail() {
        let field = LabeledField::new(4, 9);
        let mut rows: Vec<Vec<&str>> = vec![vec!["a"]; 4];
        let table: RawTable = rows.clone().into_iter().collect();
        assert_eq!(field.extract(&table), Err(HeaderError::MissingRow { row: 4 }));

        rows.push(vec![]);
        let table: RawTable = rows.clone().into_iter().collect();
        assert_eq!(field.extract(&table), Err(HeaderError::MissingCell { row: 4 }));

        rows[4] = vec!["HASTA KM"];
        let table: RawTable = rows.clone().into_iter().collect();
        assert!(matches!(field.extract(&table), Err(HeaderError::ShortText { .. })));

        rows[4] = vec!["HASTA KM: : "];
        let table: RawTable = rows.into_iter().collect();
        assert_eq!(field.extract(&table), Err(HeaderError::EmptyValue { row: 4, prefix_len: 9 }));
    }

    #[test]
    fn cut_and_fill_headers() {
        let settings = sample();
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let (cut, fill) = build_headers(&metadata(), &MetadataLayout::default(), &settings, date).unwrap();
        assert_eq!(
            cut.lines(),
            ["PROYECTO CAMINO VECINAL", "RUTA 5", "VOLUMEN DE CORTE", "DEL KM 0+000 AL KM 10+500", "2024-03-07"]
        );
        assert_eq!(fill.volume_title, "VOLUMEN DE RELLENO");
        assert_eq!(fill.station_range, cut.station_range);
    }
}
