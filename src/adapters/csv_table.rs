use crate::domain::ports::RemoteTable;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Remote store kept as one CSV file per table inside a directory.
#[derive(Debug, Clone)]
pub struct CsvDirectoryTable {
    base_path: PathBuf,
}

impl CsvDirectoryTable {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn table_path(&self, table_id: &str) -> PathBuf {
        Path::new(&self.base_path).join(format!("{}.csv", table_id))
    }
}

impl RemoteTable for CsvDirectoryTable {
    async fn read_all(&self, table_id: &str) -> Result<Vec<Vec<String>>> {
        let path = self.table_path(table_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }

    async fn clear(&self, table_id: &str) -> Result<()> {
        let path = self.table_path(table_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    async fn write_all(&self, table_id: &str, header: &[String], rows: &[Vec<String>]) -> Result<()> {
        fs::create_dir_all(&self.base_path)?;

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(self.table_path(table_id))?;
        writer.write_record(header)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}
