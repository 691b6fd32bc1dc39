use crate::config::layout::WorkbookLayout;
use crate::domain::model::{TableData, UploadBatch};
use crate::core::grid::WorkbookSnapshot;
use crate::core::reconcile::SyncReport;
use crate::utils::error::Result;
use async_trait::async_trait;

/// A remote tabular store addressed by table identifier.
///
/// `read_all` returns the header row followed by the data rows; an empty
/// vector means the table holds no data yet. The store offers no transaction
/// across `clear` and `write_all`.
pub trait RemoteTable: Send + Sync {
    fn read_all(
        &self,
        table_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Vec<String>>>> + Send;

    fn clear(&self, table_id: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    fn write_all(
        &self,
        table_id: &str,
        header: &[String],
        rows: &[Vec<String>],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn layout(&self) -> &WorkbookLayout;
    fn goals_table(&self) -> &str;
    fn movements_table(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<WorkbookSnapshot>;
    async fn transform(&self, snapshot: WorkbookSnapshot) -> Result<UploadBatch>;
    async fn load(&self, batch: UploadBatch) -> Result<SyncReport>;
}

/// Convenience for writing a whole [`TableData`] through a [`RemoteTable`].
pub async fn write_table<T: RemoteTable>(table: &T, table_id: &str, data: &TableData) -> Result<()> {
    table.write_all(table_id, &data.header, &data.rows).await
}
