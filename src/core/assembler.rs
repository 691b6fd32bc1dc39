use crate::config::layout::WorkbookLayout;
use crate::core::dates::DateReconciler;
use crate::core::grid::WorkbookSnapshot;
use crate::core::reshape::SheetReshaper;
use crate::domain::model::{MonthValue, MovementRecord};
use crate::utils::error::{EtlError, Result};

#[derive(Debug, Clone, Default)]
pub struct AssembledMovements {
    pub records: Vec<MovementRecord>,
    /// Rows discarded because their day did not form a valid date.
    pub dropped_dates: usize,
}

/// Runs reshape and date reconciliation over every configured movement sheet.
pub struct MovementAssembler<'a> {
    layout: &'a WorkbookLayout,
}

impl<'a> MovementAssembler<'a> {
    pub fn new(layout: &'a WorkbookLayout) -> Self {
        Self { layout }
    }

    pub fn assemble(
        &self,
        month: MonthValue,
        snapshot: &WorkbookSnapshot,
    ) -> Result<AssembledMovements> {
        let reconciler = DateReconciler::new(month);
        let mut assembled = AssembledMovements::default();

        for sheet in &self.layout.movement_sheets {
            let grid = snapshot.movement_sheet(&sheet.name).ok_or_else(|| {
                EtlError::schema(&sheet.name, "movement sheet not found in workbook")
            })?;

            let reshaped = SheetReshaper::new(sheet, self.layout.total_row).reshape(grid)?;
            let before = assembled.records.len();

            for row in reshaped {
                match reconciler.reconcile(&row.day) {
                    Some(date) => assembled.records.push(MovementRecord {
                        date,
                        month,
                        store: sheet.name.clone(),
                        payment_method: row.payment_method,
                        value: row.value,
                    }),
                    None => {
                        assembled.dropped_dates += 1;
                        tracing::debug!(
                            "{}: dropping {} {} with day '{}' (no such day in {})",
                            sheet.name,
                            row.payment_method,
                            row.value,
                            row.day,
                            month
                        );
                    }
                }
            }

            tracing::info!(
                "📄 {}: {} movement rows",
                sheet.name,
                assembled.records.len() - before
            );
        }

        Ok(assembled)
    }
}
