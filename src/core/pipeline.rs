use crate::adapters::memory::MemoryTable;
use crate::adapters::workbook::WorkbookReader;
use crate::core::assembler::MovementAssembler;
use crate::core::goals::GoalExtractor;
use crate::core::grid::WorkbookSnapshot;
use crate::core::reconcile::{Reconciler, SyncPolicy, SyncReport};
use crate::core::{ConfigProvider, Pipeline, RemoteTable};
use crate::domain::model::{TableData, UploadBatch};
use crate::utils::error::Result;
use std::path::PathBuf;

/// Column that must hold a number for a movement row to stay in the table.
pub const MOVEMENT_VALUE_COLUMN: &str = "value";

/// Workbook in, two remote tables out.
pub struct UploadPipeline<T: RemoteTable, C: ConfigProvider> {
    workbook_path: PathBuf,
    table: T,
    config: C,
}

impl<T: RemoteTable, C: ConfigProvider> UploadPipeline<T, C> {
    pub fn new(workbook_path: impl Into<PathBuf>, table: T, config: C) -> Self {
        Self {
            workbook_path: workbook_path.into(),
            table,
            config,
        }
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    /// Runs the merge against an in-memory copy of the current remote tables.
    /// The remote store is only read.
    pub async fn rehearse(&self, batch: UploadBatch) -> Result<SyncReport> {
        let scratch = MemoryTable::new();
        for table_id in [self.config.goals_table(), self.config.movements_table()] {
            let raw = self.table.read_all(table_id).await?;
            if let Some((header, rows)) = raw.split_first() {
                scratch.write_all(table_id, header, rows).await?;
            }
        }
        sync_batch(&scratch, &self.config, batch).await
    }
}

/// Goals first, then movements. A failed goals sync leaves movements untouched.
async fn sync_batch<T: RemoteTable, C: ConfigProvider>(
    table: &T,
    config: &C,
    batch: UploadBatch,
) -> Result<SyncReport> {
    let reconciler = Reconciler::new(table);

    let goals = reconciler
        .sync(
            config.goals_table(),
            TableData::from_records(&batch.goals),
            &SyncPolicy::default(),
        )
        .await?;

    let movements = reconciler
        .sync(
            config.movements_table(),
            TableData::from_records(&batch.movements),
            &SyncPolicy::numeric(MOVEMENT_VALUE_COLUMN),
        )
        .await?;

    Ok(SyncReport { goals, movements })
}

#[async_trait::async_trait]
impl<T: RemoteTable, C: ConfigProvider> Pipeline for UploadPipeline<T, C> {
    async fn extract(&self) -> Result<WorkbookSnapshot> {
        tracing::debug!("Reading workbook: {}", self.workbook_path.display());
        let mut reader = WorkbookReader::open(&self.workbook_path)?;
        reader.snapshot(self.config.layout())
    }

    async fn transform(&self, snapshot: WorkbookSnapshot) -> Result<UploadBatch> {
        let layout = self.config.layout();
        let extractor = GoalExtractor::new(&layout.summary);

        let (month, goals) = extractor.extract(&snapshot.summary)?;
        let assembled = MovementAssembler::new(layout).assemble(month, &snapshot)?;

        if assembled.dropped_dates > 0 {
            tracing::warn!(
                "{} movement rows dropped: day does not exist in {}",
                assembled.dropped_dates,
                month
            );
        }

        Ok(UploadBatch {
            month,
            goals,
            movements: assembled.records,
            dropped_dates: assembled.dropped_dates,
        })
    }

    async fn load(&self, batch: UploadBatch) -> Result<SyncReport> {
        sync_batch(&self.table, &self.config, batch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::SyncConfig;
    use crate::core::grid::{CellGrid, CellValue};
    use crate::domain::model::{GoalRecord, MonthValue, MovementRecord};
    use crate::utils::error::EtlError;
    use chrono::NaiveDate;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn num(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    fn summary_grid() -> CellGrid {
        let mut rows = vec![vec![CellValue::Empty; 16]; 28];
        rows[1][3] = text("03/2024");
        for (i, store) in ["SPLT", "TLPS", "PATIO", "KONI"].iter().enumerate() {
            let col = 1 + i * 4;
            rows[2][col] = text(store);
            rows[19][col + 2] = num(1000.0 * (i + 1) as f64);
            rows[23][col + 2] = num(2000.0);
            rows[27][col + 2] = num(3000.0);
        }
        CellGrid::from_rows("RESUMO", rows)
    }

    fn movement_grid(name: &str, extra: &[&str]) -> CellGrid {
        let mut header = vec![text("DIA"), text("PIX")];
        header.extend(extra.iter().map(|c| text(c)));
        let width = header.len();
        let mut first = vec![num(1.0), num(50.0)];
        first.resize(width, CellValue::Empty);
        CellGrid::from_rows(name, vec![header, first])
    }

    fn snapshot() -> WorkbookSnapshot {
        WorkbookSnapshot {
            summary: summary_grid(),
            movement_sheets: vec![
                movement_grid("SPLT", &["DISCRI", "NOME"]),
                movement_grid("TLPS", &["DISCRI"]),
                movement_grid("PATIO", &["NOME"]),
                movement_grid("KONI", &[]),
            ],
        }
    }

    fn pipeline(table: MemoryTable) -> UploadPipeline<MemoryTable, SyncConfig> {
        UploadPipeline::new("unused.xlsx", table, SyncConfig::default())
    }

    #[tokio::test]
    async fn test_transform_builds_both_record_sets() {
        let pipeline = pipeline(MemoryTable::new());
        let batch = pipeline.transform(snapshot()).await.unwrap();

        assert_eq!(batch.month, MonthValue::new(2024, 3).unwrap());
        assert_eq!(batch.goals.len(), 4);
        assert_eq!(batch.goals[0].store, "SPLT");
        assert_eq!(batch.goals[0].goal1, 1000.0);
        assert_eq!(batch.movements.len(), 4);
        assert!(batch
            .movements
            .iter()
            .all(|m| m.date == NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert_eq!(batch.movements[3].store, "KONI");
    }

    #[tokio::test]
    async fn test_load_writes_goals_and_movements() {
        let table = MemoryTable::new();
        let pipeline = pipeline(table.clone());
        let batch = pipeline.transform(snapshot()).await.unwrap();

        let report = pipeline.load(batch).await.unwrap();
        assert_eq!(report.goals.data.len(), 4);
        assert_eq!(report.movements.data.len(), 4);

        let goals = table.snapshot("METAS").await.unwrap();
        assert_eq!(goals.header, vec!["month", "store", "goal1", "goal2", "goal3"]);
        assert_eq!(goals.rows[0], vec!["03/2024", "SPLT", "1000", "2000", "3000"]);

        let movements = table.snapshot("MOVIMENTAÇÃO").await.unwrap();
        assert_eq!(
            movements.rows[0],
            vec!["2024-03-01", "03/2024", "SPLT", "PIX", "50"]
        );
    }

    #[tokio::test]
    async fn test_rehearse_leaves_remote_untouched() {
        let table = MemoryTable::with_rows(
            "METAS",
            vec![
                vec!["month".into(), "store".into(), "goal1".into(), "goal2".into(), "goal3".into()],
                vec!["02/2024".into(), "SPLT".into(), "1".into(), "2".into(), "3".into()],
            ],
        );
        let pipeline = pipeline(table.clone());
        let batch = UploadBatch {
            month: MonthValue::new(2024, 3).unwrap(),
            goals: vec![GoalRecord {
                month: MonthValue::new(2024, 3).unwrap(),
                store: "SPLT".into(),
                goal1: 10.0,
                goal2: 20.0,
                goal3: 30.0,
            }],
            movements: vec![MovementRecord {
                date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
                month: MonthValue::new(2024, 3).unwrap(),
                store: "SPLT".into(),
                payment_method: "PIX".into(),
                value: 9.5,
            }],
            dropped_dates: 0,
        };

        let report = pipeline.rehearse(batch).await.unwrap();
        assert_eq!(report.goals.existing_rows, 1);
        assert_eq!(report.goals.rows_added(), 1);
        assert_eq!(report.movements.rows_added(), 1);

        assert_eq!(table.snapshot("METAS").await.unwrap().len(), 1);
        assert!(table.snapshot("MOVIMENTAÇÃO").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_movement_sheet_fails_transform() {
        let pipeline = pipeline(MemoryTable::new());
        let mut snapshot = snapshot();
        snapshot.movement_sheets.pop();

        let err = pipeline.transform(snapshot).await.unwrap_err();
        assert!(matches!(err, EtlError::SchemaError { ref sheet, .. } if sheet == "KONI"));
    }
}
