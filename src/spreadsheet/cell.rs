use crate::spreadsheet::reference::index_to_reference;

/// Storage types of cell data in SpreadsheetML, as declared by the `t` attribute.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Boolean,
    /// Numeric values
    Number,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Cached string result of a formula
    FormulaString,
    /// Error values
    Error,
}

impl CellType {
    /// Maps the `t` attribute of a `<c>` element to a cell type.
    pub(crate) fn parse(kind: Option<&str>) -> Self {
        match kind {
            Some("inlineStr") => Self::InlineString,
            Some("s") => Self::SharedString,
            Some("str") => Self::FormulaString,
            Some("b") => Self::Boolean,
            Some("e") => Self::Error,
            _ => Self::Number,
        }
    }
}

/// Content of a single worksheet cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Bool(bool),
    /// Formula text without the leading `=`
    Formula(String),
}

impl CellValue {
    /// Builds a formula cell, accepting the text with or without a leading `=`.
    pub fn formula(text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        Self::Formula(text.strip_prefix('=').unwrap_or(text).to_owned())
    }

    /// Builds a text cell.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Returns the numeric value of a literal number cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the formula text (without `=`) of a formula cell.
    pub fn as_formula(&self) -> Option<&str> {
        match self {
            Self::Formula(formula) => Some(formula),
            _ => None,
        }
    }

    /// Returns true for formula cells.
    pub fn is_formula(&self) -> bool {
        matches!(self, Self::Formula(_))
    }
}

/// A positioned cell read from a worksheet part.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Raw `<v>` or inline text content
    pub(crate) value: String,
    /// Formula text from `<f>`, when present
    pub(crate) formula: Option<String>,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Resolves the raw content into a cell value.
    /// Formulas win over cached values; shared strings are looked up by index.
    pub(crate) fn to_value(&self, shared_strings: &[String]) -> Result<Option<CellValue>, String> {
        if let Some(formula) = self.formula.as_ref().filter(|formula| !formula.is_empty()) {
            return Ok(Some(CellValue::formula(formula)));
        }
        if self.value.is_empty() && self.kind != CellType::InlineString {
            return Ok(None);
        }
        let value = match self.kind {
            CellType::Empty => return Ok(None),
            CellType::Boolean => CellValue::Bool(self.value == "1" || self.value.eq_ignore_ascii_case("true")),
            CellType::Number => CellValue::Number(
                self.value
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| format!("'{}' is not a number", self.value))?,
            ),
            CellType::SharedString => {
                let index = self.value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| format!("'{}' is not a shared string index", self.value))?;
                let string = shared_strings
                    .get(index)
                    .ok_or_else(|| format!("shared string {index} is missing"))?;
                CellValue::Text(string.to_owned())
            }
            CellType::InlineString | CellType::FormulaString | CellType::Error => {
                CellValue::Text(self.value.to_owned())
            }
        };
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str, formula: Option<&str>) -> Cell {
        Cell {
            row: 2,
            col: 3,
            kind,
            value: value.to_owned(),
            formula: formula.map(str::to_owned),
        }
    }

    #[test]
    fn formula_prefix_is_stripped() {
        assert_eq!(CellValue::formula("=(A8-A7)/2"), CellValue::Formula("(A8-A7)/2".to_owned()));
        assert_eq!(CellValue::formula("D8+E7").as_formula(), Some("D8+E7"));
    }

    #[test]
    fn cell_resolution() {
        let shared = vec!["CUT".to_owned()];
        assert_eq!(cell(CellType::SharedString, "0", None).to_value(&shared).unwrap(), Some(CellValue::text("CUT")));
        assert_eq!(cell(CellType::Number, "12.5", None).to_value(&shared).unwrap(), Some(CellValue::Number(12.5)));
        assert_eq!(cell(CellType::Number, "60", Some("(B8+B7)*(C8)")).to_value(&shared).unwrap(), Some(CellValue::formula("(B8+B7)*(C8)")));
        assert_eq!(cell(CellType::Number, "", None).to_value(&shared).unwrap(), None);
        assert!(cell(CellType::SharedString, "4", None).to_value(&shared).is_err());
        assert_eq!(cell(CellType::Number, "1", None).reference(), "D3");
    }
}
