//! Station-interval volumes by the trapezoidal rule.
//!
//! The distance column holds half the distance between consecutive stations,
//! so the volume of an interval is `(area[i] + area[i-1]) * distance[i]` and
//! the cumulative volume is `volume[i] + cumulative[i-1]`. Row 0 of every
//! column is the literal `0`, as no interval ends at the first station.

use crate::config::VolumeMode;
use crate::report::station::StationRecord;
use crate::spreadsheet::range::Range;
use crate::spreadsheet::reference::col_to_name;
use crate::spreadsheet::CellValue;

/// 0-based spreadsheet columns referenced by the volume formulas.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FormulaColumns {
    pub station: usize,
    pub area: usize,
    pub distance: usize,
    pub volume: usize,
    pub cumulative: usize,
}

/// Distance, volume and cumulative volume columns aligned with the station records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VolumeColumnSet {
    pub distance: Vec<CellValue>,
    pub volume: Vec<CellValue>,
    pub cumulative: Vec<CellValue>,
}

impl VolumeColumnSet {
    /// Formulas for `count` records whose first record sits on the 1-based
    /// spreadsheet row `first_row`.
    pub fn formulas(count: usize, first_row: usize, columns: &FormulaColumns) -> Self {
        let station = col_to_name(columns.station);
        let area = col_to_name(columns.area);
        let distance = col_to_name(columns.distance);
        let volume = col_to_name(columns.volume);
        let cumulative = col_to_name(columns.cumulative);

        let mut set = VolumeColumnSet::with_capacity(count);
        for i in 0..count {
            if i == 0 {
                set.push_zero();
                continue;
            }
            let row = first_row + i;
            let previous = row - 1;
            set.distance.push(CellValue::formula(format!("({station}{row}-{station}{previous})/2")));
            set.volume.push(CellValue::formula(format!("({area}{row}+{area}{previous})*({distance}{row})")));
            set.cumulative.push(CellValue::formula(format!("{volume}{row}+{cumulative}{previous}")));
        }
        set
    }

    /// Literal values computed from the records.
    pub fn values(records: &[StationRecord]) -> Self {
        let mut set = VolumeColumnSet::with_capacity(records.len());
        let mut total = 0.0;
        for (i, record) in records.iter().enumerate() {
            if i == 0 {
                set.push_zero();
                continue;
            }
            let previous = &records[i - 1];
            let distance = (record.station - previous.station) / 2.0;
            let volume = (record.area + previous.area) * distance;
            total += volume;
            set.distance.push(CellValue::Number(distance));
            set.volume.push(CellValue::Number(volume));
            set.cumulative.push(CellValue::Number(total));
        }
        set
    }

    fn with_capacity(capacity: usize) -> Self {
        VolumeColumnSet {
            distance: Vec::with_capacity(capacity),
            volume: Vec::with_capacity(capacity),
            cumulative: Vec::with_capacity(capacity),
        }
    }

    fn push_zero(&mut self) {
        self.distance.push(CellValue::Number(0.0));
        self.volume.push(CellValue::Number(0.0));
        self.cumulative.push(CellValue::Number(0.0));
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.volume.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volume.is_empty()
    }

    /// Sum of the literal volumes; formula cells count as zero.
    pub fn total(&self) -> f64 {
        self.partial_total(self.len())
    }

    /// Sum of the first `count` literal volumes.
    fn partial_total(&self, count: usize) -> f64 {
        self.volume.iter().take(count).filter_map(CellValue::as_number).sum()
    }

    /// Summary cell of the volume column over the 1-based rows
    /// `first_row..=last_row`, the first record sitting on `first_row`.
    ///
    /// Formula mode writes `SUM` over that range of `column`; values mode adds
    /// up the same records. An empty set always sums to the literal `0`.
    pub fn sum_cell(&self, mode: VolumeMode, column: usize, first_row: usize, last_row: usize) -> CellValue {
        if self.is_empty() {
            return CellValue::Number(0.0);
        }
        match mode {
            VolumeMode::Formulas => {
                let range = Range::column_span(column, first_row.saturating_sub(1), last_row.saturating_sub(1));
                CellValue::formula(format!("SUM({range})"))
            }
            VolumeMode::Values => {
                let count = (last_row + 1).saturating_sub(first_row);
                CellValue::Number(self.partial_total(count))
            }
        }
    }
}
