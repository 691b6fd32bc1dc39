use crate::core::grid::{excel_serial_to_datetime, CellValue};
use crate::domain::model::MonthValue;
use chrono::NaiveDate;

/// Reads the workbook month from its cell: `MM/YYYY` text, a date cell, or
/// an Excel serial number.
pub fn month_from_cell(cell: &CellValue) -> Option<MonthValue> {
    match cell {
        CellValue::Text(s) => MonthValue::parse(s),
        CellValue::DateTime(dt) => Some(MonthValue::from_date(dt.date())),
        CellValue::Number(serial) => {
            excel_serial_to_datetime(*serial).map(|dt| MonthValue::from_date(dt.date()))
        }
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}

/// Rebuilds full dates from a day-of-month cell and the upload month.
#[derive(Debug, Clone, Copy)]
pub struct DateReconciler {
    month: MonthValue,
}

impl DateReconciler {
    pub fn new(month: MonthValue) -> Self {
        Self { month }
    }

    /// Day number of the cell, truncated toward zero. `None` when the cell
    /// holds nothing numeric.
    pub fn coerce_day(day: &CellValue) -> Option<i64> {
        day.as_number().map(|n| n.trunc() as i64)
    }

    /// The date for `day` in the upload month, or `None` when the day is
    /// missing or does not exist in that month. Never clamps.
    pub fn reconcile(&self, day: &CellValue) -> Option<NaiveDate> {
        let day = Self::coerce_day(day)?;
        let day = u32::try_from(day).ok()?;
        self.month.with_day(day)
    }
}
