use thiserror::Error;

/// Main error type for the volume sheet builder.
/// Aggregates errors from the standard library, dependencies and internal modules.
#[derive(Error, Debug)]
pub enum VolumeSheetError {
    #[error("{context}: {source}")]
    WithContextError {
        context: String,
        source: Box<VolumeSheetError>,
    },

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    // Third-party library errors
    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Domain module errors
    #[error("{0}")]
    ConfigError(#[from] crate::config::ConfigError),

    #[error("{0}")]
    SourceError(#[from] crate::source::SourceError),

    #[error("{0}")]
    ReportError(#[from] crate::report::ReportError),

    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),
}

/// Broad failure categories surfaced to the user as distinct exit codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Settings file missing, unreadable or incomplete.
    Config,
    /// An input file does not have the expected tables, rows or values.
    InputFormat,
    /// Filesystem, archive or XML failures while reading or writing.
    Io,
}

impl ErrorKind {
    /// Process exit code for this category.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config => 2,
            Self::InputFormat => 3,
            Self::Io => 4,
        }
    }
}

impl VolumeSheetError {
    /// Classifies the error, looking through attached context.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::WithContextError { source, .. } => source.kind(),
            Self::ConfigError(_) => ErrorKind::Config,
            Self::ReportError(error) if error.is_config() => ErrorKind::Config,
            Self::SourceError(error) if error.is_io() => ErrorKind::Io,
            Self::SourceError(_) | Self::ReportError(_) => ErrorKind::InputFormat,
            _ => ErrorKind::Io,
        }
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, VolumeSheetError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| VolumeSheetError::WithContextError {
            context: message.to_owned(),
            source: Box::new(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::report::ReportError;

    #[test]
    fn kind_survives_context() {
        let result: Result<(), VolumeSheetError> =
            Err(ReportError::EmptyStation { row: 3 }.into());
        let error = result.with_prefix("survey.htm").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InputFormat);
        assert!(error.to_string().starts_with("survey.htm: "));
    }

    #[test]
    fn exit_codes_are_distinct() {
        let config: VolumeSheetError = ConfigError::Invalid("columnsForCut".to_owned()).into();
        let io: VolumeSheetError = std::io::Error::other("locked").into();
        assert_eq!(config.kind().exit_code(), 2);
        assert_eq!(io.kind().exit_code(), 4);
        assert_eq!(ErrorKind::InputFormat.exit_code(), 3);
    }
}
