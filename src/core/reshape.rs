use crate::config::layout::MovementSheetConfig;
use crate::core::grid::{CellGrid, CellValue};
use crate::utils::error::{EtlError, Result};

/// One (sheet row, payment column) pair that carried a movement.
#[derive(Debug, Clone, PartialEq)]
pub struct ReshapedRow {
    /// Day-of-month cell as found in the sheet, not yet validated.
    pub day: CellValue,
    pub payment_method: String,
    pub value: f64,
}

/// Turns the wide payment-method columns of a movement sheet into long rows.
pub struct SheetReshaper<'a> {
    config: &'a MovementSheetConfig,
    total_row: usize,
}

impl<'a> SheetReshaper<'a> {
    pub fn new(config: &'a MovementSheetConfig, total_row: usize) -> Self {
        Self { config, total_row }
    }

    pub fn reshape(&self, grid: &CellGrid) -> Result<Vec<ReshapedRow>> {
        let labels = grid.column_labels();
        let kept: Vec<(usize, &str)> = labels
            .iter()
            .enumerate()
            .filter(|(_, label)| !self.config.drop_columns.iter().any(|d| d == *label))
            .map(|(col, label)| (col, label.as_str()))
            .collect();

        let Some((&(day_col, _), payment_cols)) = kept.split_first() else {
            return Err(EtlError::schema(
                grid.name(),
                "no columns left after dropping descriptive columns",
            ));
        };

        let mut output = Vec::new();
        let mut non_numeric = 0usize;

        for (index, row) in grid.rows().enumerate() {
            if index == self.total_row {
                continue;
            }
            let day = &row[day_col];
            if is_total_label(day) {
                continue;
            }

            for &(col, label) in payment_cols {
                let value = match &row[col] {
                    cell if cell.is_empty() => 0.0,
                    cell => match cell.as_number() {
                        Some(n) => n,
                        None => {
                            non_numeric += 1;
                            tracing::debug!(
                                "{}: skipping non-numeric value '{}' in column '{}' (row {})",
                                grid.name(),
                                cell,
                                label,
                                index
                            );
                            continue;
                        }
                    },
                };

                if value == 0.0 {
                    continue;
                }

                output.push(ReshapedRow {
                    day: day.clone(),
                    payment_method: label.trim().to_string(),
                    value,
                });
            }
        }

        tracing::debug!(
            "{}: {} movement cells from {} payment columns ({} non-numeric skipped)",
            grid.name(),
            output.len(),
            payment_cols.len(),
            non_numeric
        );

        Ok(output)
    }
}

fn is_total_label(day: &CellValue) -> bool {
    day.to_string().to_lowercase().contains("total")
}
