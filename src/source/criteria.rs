use crate::error::VolumeSheetError;
use glob::MatchOptions;
use glob::Pattern;

/// File name patterns of the survey exports picked up from a directory.
pub(crate) const SOURCE_PATTERNS: [&str; 2] = ["*.htm", "*.html"];

/// Criteria for selecting input files from a directory listing.
#[derive(Clone, Debug)]
pub(crate) struct Criteria {
    /// File name patterns, matched case-insensitively.
    pub(crate) file_name_patterns: Vec<Pattern>,
}

impl Criteria {
    /// Compiles the given glob patterns.
    pub(crate) fn new(patterns: &[&str]) -> Result<Self, VolumeSheetError> {
        let file_name_patterns = patterns
            .iter()
            .map(|pattern| Pattern::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Criteria { file_name_patterns })
    }

    /// Checks if a file name matches any of the patterns.
    pub(crate) fn accept(&self, file_name: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        self.file_name_patterns
            .iter()
            .any(|pattern| pattern.matches_with(file_name, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_exports_are_accepted() {
        let criteria = Criteria::new(&SOURCE_PATTERNS).unwrap();
        assert!(criteria.accept("survey.htm"));
        assert!(criteria.accept("Survey_KM10.HTML"));
        assert!(!criteria.accept("survey.htm.bak"));
        assert!(!criteria.accept("output.xlsx"));
    }

    #[test]
    fn custom_patterns() {
        let criteria = Criteria::new(&["tramo_*.htm"]).unwrap();
        assert!(criteria.accept("TRAMO_1.htm"));
        assert!(!criteria.accept("other.htm"));
        assert!(Criteria::new(&["[a"]).is_err());
    }
}
