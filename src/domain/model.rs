use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Year and month shared by every record of one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthValue {
    pub year: i32,
    pub month: u32,
}

impl MonthValue {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Accepts `MM/YYYY`, `M/YYYY` and `YYYY-MM`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some((month, year)) = text.split_once('/') {
            return Self::new(year.trim().parse().ok()?, month.trim().parse().ok()?);
        }
        let (year, month) = text.split_once('-')?;
        if year.len() != 4 {
            return None;
        }
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }

    /// `None` when `day` does not exist in this month.
    pub fn with_day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn days_in_month(&self) -> u32 {
        (28..=31)
            .rev()
            .find(|day| self.with_day(*day).is_some())
            .unwrap_or(28)
    }
}

impl fmt::Display for MonthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRecord {
    pub month: MonthValue,
    pub store: String,
    pub goal1: f64,
    pub goal2: f64,
    pub goal3: f64,
}

/// One (day, payment method) movement of a store. Always carries a real
/// calendar date and a non-zero value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub date: NaiveDate,
    pub month: MonthValue,
    pub store: String,
    pub payment_method: String,
    pub value: f64,
}

/// A record type that can be written as a row of a remote table.
pub trait TableRecord {
    const HEADER: &'static [&'static str];

    fn to_cells(&self) -> Vec<String>;
}

impl TableRecord for GoalRecord {
    const HEADER: &'static [&'static str] = &["month", "store", "goal1", "goal2", "goal3"];

    fn to_cells(&self) -> Vec<String> {
        vec![
            self.month.to_string(),
            self.store.clone(),
            format_number(self.goal1),
            format_number(self.goal2),
            format_number(self.goal3),
        ]
    }
}

impl TableRecord for MovementRecord {
    const HEADER: &'static [&'static str] = &["date", "month", "store", "payment_method", "value"];

    fn to_cells(&self) -> Vec<String> {
        vec![
            self.date.format("%Y-%m-%d").to_string(),
            self.month.to_string(),
            self.store.clone(),
            self.payment_method.clone(),
            format_number(self.value),
        ]
    }
}

/// Shortest round-trip rendering, so `150.0` becomes `150`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // folds -0.0
        return "0".to_string();
    }
    value.to_string()
}

/// Header plus data rows of a remote table, every cell as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn from_records<R: TableRecord>(records: &[R]) -> Self {
        Self {
            header: R::HEADER.iter().map(|h| h.to_string()).collect(),
            rows: records.iter().map(TableRecord::to_cells).collect(),
        }
    }

    /// Splits raw store rows into header and data. No rows means no table.
    pub fn from_raw_rows(mut raw: Vec<Vec<String>>) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let header = raw.remove(0);
        Some(Self { header, rows: raw })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Both record sets produced from one workbook.
#[derive(Debug, Clone)]
pub struct UploadBatch {
    pub month: MonthValue,
    pub goals: Vec<GoalRecord>,
    pub movements: Vec<MovementRecord>,
    pub dropped_dates: usize,
}
