use crate::domain::model::TableData;
use crate::domain::ports::RemoteTable;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-process remote store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    tables: Arc<Mutex<HashMap<String, Vec<Vec<String>>>>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with raw rows (header first) for one table.
    pub fn with_rows(table_id: &str, rows: Vec<Vec<String>>) -> Self {
        let mut tables = HashMap::new();
        tables.insert(table_id.to_string(), rows);
        Self {
            tables: Arc::new(Mutex::new(tables)),
        }
    }

    pub async fn snapshot(&self, table_id: &str) -> Option<TableData> {
        let tables = self.tables.lock().await;
        tables
            .get(table_id)
            .cloned()
            .and_then(TableData::from_raw_rows)
    }
}

impl RemoteTable for MemoryTable {
    async fn read_all(&self, table_id: &str) -> Result<Vec<Vec<String>>> {
        let tables = self.tables.lock().await;
        Ok(tables.get(table_id).cloned().unwrap_or_default())
    }

    async fn clear(&self, table_id: &str) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.remove(table_id);
        Ok(())
    }

    async fn write_all(&self, table_id: &str, header: &[String], rows: &[Vec<String>]) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let mut raw = Vec::with_capacity(rows.len() + 1);
        raw.push(header.to_vec());
        raw.extend(rows.iter().cloned());
        tables.insert(table_id.to_string(), raw);
        Ok(())
    }
}
