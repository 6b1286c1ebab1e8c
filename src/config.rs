//! Report settings loaded from a JSON file.
//!
//! Every component receives the [`Settings`] value it needs at its entry
//! point; nothing reads settings from global state.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Default settings file name, looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "app_settings.json";

/// Default template of the station range header line.
pub const DEFAULT_STATION_RANGE_FORMAT: &str = "DEL KM {start} AL KM {end}";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read settings file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid settings file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Whether the volume columns hold live formulas or computed numbers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeMode {
    #[default]
    Formulas,
    Values,
}

/// Report settings. Field names follow the camelCase keys of the settings file.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub project_title: String,
    pub cut_volume_title: String,
    pub fill_volume_title: String,
    pub volume_header: String,
    pub acum_volume_header: String,
    pub distance_header: String,
    /// Station column first, area column last
    pub columns_for_cut: Vec<String>,
    /// Station column first, area column last
    pub columns_for_fill: Vec<String>,

    pub gap_rows_before_project_data: usize,
    pub gap_rows_before_volume_data: usize,
    pub gap_rows_before_sum_volume_data: usize,

    pub start_row_for_project_data: usize,
    pub start_column_for_project_data: usize,
    pub start_row_for_volume_data: usize,
    pub start_column_for_volume_data: usize,

    #[serde(default)]
    pub volume_mode: VolumeMode,
    #[serde(default = "default_include_sum_row")]
    pub include_sum_row: bool,
    #[serde(default)]
    pub sum_label: Option<String>,
    #[serde(default = "default_station_range_format")]
    pub station_range_format: String,
}

fn default_include_sum_row() -> bool {
    true
}

fn default_station_range_format() -> String {
    DEFAULT_STATION_RANGE_FORMAT.to_owned()
}

impl Settings {
    /// Loads and validates the settings file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&text).map_err(|error| match error {
            ConfigError::ParseError { source, .. } => ConfigError::ParseError {
                path: path.to_owned(),
                source,
            },
            other => other,
        })
    }

    /// Parses and validates settings from JSON text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(text).map_err(|source| ConfigError::ParseError {
            path: PathBuf::new(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, columns) in [("columnsForCut", &self.columns_for_cut), ("columnsForFill", &self.columns_for_fill)] {
            if columns.len() < 2 {
                return Err(ConfigError::Invalid(format!(
                    "{key} needs a station column and an area column, got {}",
                    columns.len()
                )));
            }
        }
        if self.columns_for_cut.len() != self.columns_for_fill.len() {
            return Err(ConfigError::Invalid(
                "columnsForCut and columnsForFill must have the same number of columns".to_owned(),
            ));
        }
        if !self.station_range_format.contains("{start}") || !self.station_range_format.contains("{end}") {
            return Err(ConfigError::Invalid(
                "stationRangeFormat must contain {start} and {end}".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE: &str = r#"{
        "projectTitle": "PROYECTO CAMINO VECINAL",
        "cutVolumeTitle": "VOLUMEN DE CORTE",
        "fillVolumeTitle": "VOLUMEN DE RELLENO",
        "volumeHeader": "Volumen (m3)",
        "acumVolumeHeader": "Vol. Acumulado (m3)",
        "distanceHeader": "Distancia/2 (m)",
        "columnsForCut": ["Station", "Cut Area (Sq.m.)"],
        "columnsForFill": ["Station", "Fill Area (Sq.m.)"],
        "gapRowsBeforeProjectData": 1,
        "gapRowsBeforeVolumeData": 1,
        "gapRowsBeforeSumVolumeData": 1,
        "startRowForProjectData": 0,
        "startColumnForProjectData": 0,
        "startRowForVolumeData": 6,
        "startColumnForVolumeData": 0
    }"#;

    /// Settings used across the crate's unit tests.
    pub(crate) fn sample() -> Settings {
        Settings::parse(SAMPLE).unwrap()
    }

    #[test]
    fn optional_keys_have_defaults() {
        let settings = sample();
        assert_eq!(settings.volume_mode, VolumeMode::Formulas);
        assert!(settings.include_sum_row);
        assert_eq!(settings.sum_label, None);
        assert_eq!(settings.station_range_format, DEFAULT_STATION_RANGE_FORMAT);
        assert_eq!(settings.start_row_for_volume_data, 6);
    }

    #[test]
    fn missing_key_fails() {
        let text = SAMPLE.replace("\"distanceHeader\": \"Distancia/2 (m)\",", "");
        let error = Settings::parse(&text).unwrap_err();
        assert!(matches!(error, ConfigError::ParseError { .. }));
        assert!(error.to_string().contains("distanceHeader"));
    }

    #[test]
    fn column_lists_are_validated() {
        let text = SAMPLE.replace(r#"["Station", "Cut Area (Sq.m.)"]"#, r#"["Station"]"#);
        assert!(matches!(Settings::parse(&text), Err(ConfigError::Invalid(_))));

        let text = SAMPLE.replace(
            r#"["Station", "Fill Area (Sq.m.)"]"#,
            r#"["Station", "Offset", "Fill Area (Sq.m.)"]"#,
        );
        assert!(matches!(Settings::parse(&text), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn optional_flags() {
        let text = SAMPLE.replace(
            "\"startColumnForVolumeData\": 0",
            "\"startColumnForVolumeData\": 0, \"volumeMode\": \"values\", \"includeSumRow\": false, \"sumLabel\": \"SUMA\"",
        );
        let settings = Settings::parse(&text).unwrap();
        assert_eq!(settings.volume_mode, VolumeMode::Values);
        assert!(!settings.include_sum_row);
        assert_eq!(settings.sum_label.as_deref(), Some("SUMA"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let error = Settings::load(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(error, ConfigError::ReadError { .. }));
    }
}
