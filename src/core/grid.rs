use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::fmt;

/// Raw content of one worksheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric reading of the cell: numbers as-is, text when it parses.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", dt),
        }
    }
}

/// Converts an Excel serial date (1900 date system) into a timestamp.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

static EMPTY: CellValue = CellValue::Empty;

/// Read-only view of one worksheet: a header row plus body rows.
///
/// Body cells are addressed `(row, col)` from 0, starting at the first row
/// below the header.
#[derive(Debug, Clone, PartialEq)]
pub struct CellGrid {
    name: String,
    header: Vec<CellValue>,
    rows: Vec<Vec<CellValue>>,
    width: usize,
}

impl CellGrid {
    /// Builds a grid from the sheet's rows as they appear, header first.
    pub fn from_rows(name: impl Into<String>, mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in rows.iter_mut() {
            row.resize(width, CellValue::Empty);
        }
        let header = if rows.is_empty() {
            Vec::new()
        } else {
            rows.remove(0)
        };
        Self {
            name: name.into(),
            header,
            rows,
            width,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Body cell, `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Body cell, empty outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.get(row, col).unwrap_or(&EMPTY)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Column labels, normalized like a dataframe reader names columns:
    /// numbers are rendered, blank labels become `Unnamed: {col}` and
    /// repeated labels get `.1`, `.2`, ... suffixes in order of appearance.
    pub fn column_labels(&self) -> Vec<String> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut labels = Vec::with_capacity(self.width);

        for col in 0..self.width {
            let raw = self.header.get(col).unwrap_or(&EMPTY);
            let base = if raw.is_empty() {
                format!("Unnamed: {}", col)
            } else {
                raw.to_string()
            };

            let mut label = base.clone();
            if let Some(mut suffix) = seen.get(&base).copied() {
                loop {
                    suffix += 1;
                    label = format!("{}.{}", base, suffix);
                    if !seen.contains_key(&label) {
                        break;
                    }
                }
                seen.insert(base, suffix);
            }
            seen.entry(label.clone()).or_insert(0);
            labels.push(label);
        }

        labels
    }
}

/// All sheets one run needs, read once from the workbook.
#[derive(Debug, Clone)]
pub struct WorkbookSnapshot {
    pub summary: CellGrid,
    pub movement_sheets: Vec<CellGrid>,
}

impl WorkbookSnapshot {
    pub fn movement_sheet(&self, name: &str) -> Option<&CellGrid> {
        self.movement_sheets.iter().find(|grid| grid.name() == name)
    }
}
