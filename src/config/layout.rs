//! Workbook schema knowledge: fixed cell positions of the summary sheet and
//! the per-sheet column drop lists of the movement sheets.
//!
//! Coordinates are 0-based and relative to the first row below the sheet's
//! header row, so `CellRef { row: 0, col: 3 }` is the cell shown as `D2`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Name cell and the three goal cells of one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSlot {
    pub name: CellRef,
    pub goals: [CellRef; 3],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryLayout {
    #[serde(default)]
    pub sheet_index: usize,
    pub month: CellRef,
    pub stores: Vec<StoreSlot>,
}

impl SummaryLayout {
    /// Smallest (rows, cols) a summary grid must have for every position to exist.
    pub fn required_size(&self) -> (usize, usize) {
        let cells = std::iter::once(self.month).chain(
            self.stores
                .iter()
                .flat_map(|slot| std::iter::once(slot.name).chain(slot.goals)),
        );
        cells.fold((0, 0), |(rows, cols), cell| {
            (rows.max(cell.row + 1), cols.max(cell.col + 1))
        })
    }
}

impl Default for SummaryLayout {
    fn default() -> Self {
        // B3/F3/J3/N3 hold store names, goals sit on rows 20, 24 and 28
        // two columns to the right of each name.
        let stores = [1usize, 5, 9, 13]
            .into_iter()
            .map(|col| StoreSlot {
                name: CellRef::new(1, col),
                goals: [
                    CellRef::new(18, col + 2),
                    CellRef::new(22, col + 2),
                    CellRef::new(26, col + 2),
                ],
            })
            .collect();

        Self {
            sheet_index: 0,
            month: CellRef::new(0, 3),
            stores,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementSheetConfig {
    pub name: String,
    #[serde(default)]
    pub drop_columns: Vec<String>,
}

impl MovementSheetConfig {
    pub fn new(name: &str, drop_columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            drop_columns: drop_columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

fn default_total_row() -> usize {
    32
}

fn default_movement_sheets() -> Vec<MovementSheetConfig> {
    vec![
        MovementSheetConfig::new(
            "SPLT",
            &["DISCRI", "NOME", "NOME.1", "NOME.2", "DISTRI", "NOME.3", "NOME.4"],
        ),
        MovementSheetConfig::new("TLPS", &["DISCRI", "NOME", "NOME.1", "NOME.2", "NOME.3"]),
        MovementSheetConfig::new("PATIO", &["DISCRI", "NOME", "NOME.1", "DISCRIM"]),
        MovementSheetConfig::new("KONI", &["DISCRI", "NOME", "NOME.1", "NOME.2", "1", "DISCRI.1"]),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkbookLayout {
    #[serde(default)]
    pub summary: SummaryLayout,
    /// Body row reserved for the monthly total line in every movement sheet.
    #[serde(default = "default_total_row")]
    pub total_row: usize,
    #[serde(default = "default_movement_sheets")]
    pub movement_sheets: Vec<MovementSheetConfig>,
}

impl Default for WorkbookLayout {
    fn default() -> Self {
        Self {
            summary: SummaryLayout::default(),
            total_row: default_total_row(),
            movement_sheets: default_movement_sheets(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_summary_positions() {
        let layout = SummaryLayout::default();
        assert_eq!(layout.month, CellRef::new(0, 3));
        assert_eq!(layout.stores.len(), 4);
        assert_eq!(layout.stores[3].name, CellRef::new(1, 13));
        assert_eq!(layout.stores[3].goals[2], CellRef::new(26, 15));
        assert_eq!(layout.required_size(), (27, 16));
    }

    #[test]
    fn test_default_movement_sheets_order() {
        let layout = WorkbookLayout::default();
        let names: Vec<&str> = layout
            .movement_sheets
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["SPLT", "TLPS", "PATIO", "KONI"]);
        assert_eq!(layout.total_row, 32);
    }
}
