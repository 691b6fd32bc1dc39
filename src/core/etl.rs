use crate::core::reconcile::SyncReport;
use crate::core::Pipeline;
use crate::domain::model::UploadBatch;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Extract and transform only; nothing is sent to the remote store.
    pub async fn preview(&self) -> Result<UploadBatch> {
        tracing::info!("📖 Extracting workbook...");
        let snapshot = self.pipeline.extract().await?;
        tracing::info!(
            "Read summary sheet and {} movement sheets",
            snapshot.movement_sheets.len()
        );
        self.monitor.log_stage("Extract");

        tracing::info!("🛠️ Transforming...");
        let batch = self.pipeline.transform(snapshot).await?;
        tracing::info!(
            "Built {} goal rows and {} movement rows for {}",
            batch.goals.len(),
            batch.movements.len(),
            batch.month
        );
        self.monitor.log_stage("Transform");

        Ok(batch)
    }

    pub async fn run(&self) -> Result<SyncReport> {
        tracing::info!("Starting upload...");

        let batch = self.preview().await?;

        tracing::info!("📤 Loading into remote tables...");
        let report = self.pipeline.load(batch).await?;
        self.monitor.log_stage("Load");

        tracing::info!(
            "Goals: {} rows ({} added), movements: {} rows ({} added)",
            report.goals.data.len(),
            report.goals.rows_added(),
            report.movements.data.len(),
            report.movements.rows_added()
        );

        Ok(report)
    }
}
