use crate::config::layout::{CellRef, SummaryLayout};
use crate::core::dates::month_from_cell;
use crate::core::grid::CellGrid;
use crate::domain::model::{GoalRecord, MonthValue};
use crate::utils::error::{EtlError, Result};

/// Pulls the month and per-store goals out of the summary sheet.
pub struct GoalExtractor<'a> {
    layout: &'a SummaryLayout,
}

impl<'a> GoalExtractor<'a> {
    pub fn new(layout: &'a SummaryLayout) -> Self {
        Self { layout }
    }

    fn check_shape(&self, grid: &CellGrid) -> Result<()> {
        let (rows, cols) = self.layout.required_size();
        if grid.height() < rows || grid.width() < cols {
            return Err(EtlError::schema(
                grid.name(),
                format!(
                    "summary sheet is {}x{} but the layout needs at least {}x{}",
                    grid.height(),
                    grid.width(),
                    rows,
                    cols
                ),
            ));
        }
        Ok(())
    }

    fn month(&self, grid: &CellGrid) -> Result<MonthValue> {
        self.check_shape(grid)?;
        let CellRef { row, col } = self.layout.month;
        let cell = grid.cell(row, col);
        month_from_cell(cell).ok_or_else(|| {
            EtlError::schema(
                grid.name(),
                format!("month cell ({}, {}) holds '{}', expected MM/YYYY", row, col, cell),
            )
        })
    }

    /// Reads the month cell and one goal row per configured store.
    pub fn extract(&self, grid: &CellGrid) -> Result<(MonthValue, Vec<GoalRecord>)> {
        let month = self.month(grid)?;

        let goals = self
            .layout
            .stores
            .iter()
            .map(|slot| {
                let store = grid.cell(slot.name.row, slot.name.col).to_string();
                let [goal1, goal2, goal3] = slot.goals.map(|at| goal_value(grid, at));
                GoalRecord {
                    month,
                    store: store.trim().to_string(),
                    goal1,
                    goal2,
                    goal3,
                }
            })
            .collect::<Vec<_>>();

        tracing::info!("🎯 Extracted {} goal rows for {}", goals.len(), month);
        for goal in &goals {
            tracing::debug!(
                "  {} -> {} / {} / {}",
                goal.store,
                goal.goal1,
                goal.goal2,
                goal.goal3
            );
        }

        Ok((month, goals))
    }
}

/// Absent goals count as zero.
fn goal_value(grid: &CellGrid, at: CellRef) -> f64 {
    let cell = grid.cell(at.row, at.col);
    match cell.as_number() {
        Some(n) => n,
        None => {
            if !cell.is_empty() {
                tracing::warn!(
                    "Goal cell ({}, {}) of '{}' is not numeric ('{}'), using 0",
                    at.row,
                    at.col,
                    grid.name(),
                    cell
                );
            }
            0.0
        }
    }
}
