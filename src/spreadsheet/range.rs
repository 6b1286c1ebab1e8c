use crate::spreadsheet::reference::col_to_name;
use std::fmt::Display;

/// Represents an Excel-style cell range with optional boundaries.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Range {
    /// Lower row bound (0-based index), None for unbounded
    pub row_lower_bound: Option<usize>,
    /// Upper row bound (0-based index), None for unbounded
    pub row_upper_bound: Option<usize>,
    /// Lower column bound (0-based index), None for unbounded
    pub col_lower_bound: Option<usize>,
    /// Upper column bound (0-based index), None for unbounded
    pub col_upper_bound: Option<usize>,
}

impl Range {
    /// A bounded range inside one column, rows given 0-based and inclusive.
    pub fn column_span(col: usize, row_lower: usize, row_upper: usize) -> Self {
        Range {
            row_lower_bound: Some(row_lower),
            row_upper_bound: Some(row_upper),
            col_lower_bound: Some(col),
            col_upper_bound: Some(col),
        }
    }
}

impl Display for Range {
    /// Formats the range in A1 notation, e.g. `D7:D12`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let corner = |col: Option<usize>, row: Option<usize>| {
            format!(
                "{}{}",
                col.map(col_to_name).unwrap_or_default(),
                row.map(|row| (row + 1).to_string()).unwrap_or_default()
            )
        };
        let lower = corner(self.col_lower_bound, self.row_lower_bound);
        let upper = corner(self.col_upper_bound, self.row_upper_bound);
        if upper.is_empty() || upper == lower {
            write!(f, "{lower}")
        } else {
            write!(f, "{lower}:{upper}")
        }
    }
}
