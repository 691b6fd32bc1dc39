use crate::config::layout::WorkbookLayout;
use crate::core::grid::{excel_serial_to_datetime, CellGrid, CellValue, WorkbookSnapshot};
use crate::utils::error::{EtlError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Empty),
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(CellValue::DateTime)
            .unwrap_or_else(|_| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Lays the used range out from A1 so indices match what the sheet shows.
fn grid_from_range(name: &str, range: &Range<Data>) -> CellGrid {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows = vec![Vec::new(); row_offset];
    for source in range.rows() {
        let mut row = vec![CellValue::Empty; col_offset];
        row.extend(source.iter().map(cell_value));
        rows.push(row);
    }

    CellGrid::from_rows(name, rows)
}

/// Spreadsheet file opened for one upload.
pub struct WorkbookReader {
    sheets: Sheets<BufReader<File>>,
}

impl WorkbookReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Opening workbook {}", path.display());
        let sheets = open_workbook_auto(path)?;
        Ok(Self { sheets })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    pub fn sheet_at(&mut self, index: usize) -> Result<CellGrid> {
        let name = self
            .sheet_names()
            .get(index)
            .cloned()
            .ok_or_else(|| EtlError::schema(format!("#{}", index), "workbook has no such sheet"))?;
        self.sheet(&name)
    }

    pub fn sheet(&mut self, name: &str) -> Result<CellGrid> {
        if !self.sheet_names().iter().any(|n| n == name) {
            return Err(EtlError::schema(name, "sheet not found in workbook"));
        }
        let range = self.sheets.worksheet_range(name)?;
        let grid = grid_from_range(name, &range);
        tracing::debug!("Sheet '{}': {}x{}", name, grid.height(), grid.width());
        Ok(grid)
    }

    /// Reads the summary sheet and every configured movement sheet.
    pub fn snapshot(&mut self, layout: &WorkbookLayout) -> Result<WorkbookSnapshot> {
        let summary = self.sheet_at(layout.summary.sheet_index)?;
        let movement_sheets = layout
            .movement_sheets
            .iter()
            .map(|sheet| self.sheet(&sheet.name))
            .collect::<Result<Vec<_>>>()?;

        Ok(WorkbookSnapshot {
            summary,
            movement_sheets,
        })
    }
}
