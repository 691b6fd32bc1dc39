//! Merge-with-dedup synchronization of a record set into a remote table.
//!
//! Deduplication compares whole rows after trimming every cell. Two rows that
//! differ in any column are both kept, so a corrected value for an already
//! uploaded day shows up as a second row instead of replacing the first.

use crate::domain::model::TableData;
use crate::domain::ports::{write_table, RemoteTable};
use crate::utils::error::Result;
use std::collections::HashSet;

/// Extra rules applied to one table during a sync pass.
#[derive(Debug, Clone, Default)]
pub struct SyncPolicy {
    /// After the merge-write, rows whose cell in this column is not a finite
    /// number are removed and the table is written again.
    pub numeric_column: Option<String>,
}

impl SyncPolicy {
    pub fn numeric(column: &str) -> Self {
        Self {
            numeric_column: Some(column.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub table_id: String,
    /// Table contents as last written.
    pub data: TableData,
    pub existing_rows: usize,
    pub incoming_rows: usize,
    /// Incoming rows still in the table after dedup and filtering.
    pub incoming_kept: usize,
    pub duplicates_removed: usize,
    pub non_numeric_removed: usize,
}

impl SyncOutcome {
    /// Rows this pass added on top of what the table already held.
    pub fn rows_added(&self) -> usize {
        self.incoming_kept
    }
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub goals: SyncOutcome,
    pub movements: SyncOutcome,
}

pub struct Reconciler<'a, T: RemoteTable> {
    table: &'a T,
}

impl<'a, T: RemoteTable> Reconciler<'a, T> {
    pub fn new(table: &'a T) -> Self {
        Self { table }
    }

    /// Table contents exactly as the store returned them.
    async fn read(&self, table_id: &str) -> Result<Option<TableData>> {
        let raw = self.table.read_all(table_id).await?;
        Ok(TableData::from_raw_rows(raw))
    }

    /// Clears the table and writes `data`. When the write fails after the
    /// clear, `previous` is written back once and the write error returned.
    async fn replace(
        &self,
        table_id: &str,
        data: &TableData,
        previous: Option<&TableData>,
    ) -> Result<()> {
        self.table.clear(table_id).await?;
        let Err(err) = write_table(self.table, table_id, data).await else {
            return Ok(());
        };

        if let Some(previous) = previous {
            tracing::warn!(
                "{}: write failed, restoring the {} rows read before clearing",
                table_id,
                previous.len()
            );
            if let Err(restore_err) = write_table(self.table, table_id, previous).await {
                tracing::error!("{}: restore failed: {}", table_id, restore_err);
            }
        }
        Err(err)
    }

    pub async fn sync(
        &self,
        table_id: &str,
        incoming: TableData,
        policy: &SyncPolicy,
    ) -> Result<SyncOutcome> {
        let previous = self.read(table_id).await?;
        let existing = previous.clone().map(normalize);
        let existing_rows = existing.as_ref().map_or(0, TableData::len);
        let incoming = normalize(incoming);
        let incoming_rows = incoming.len();

        tracing::info!(
            "🔄 {}: merging {} new rows into {} existing",
            table_id,
            incoming_rows,
            existing_rows
        );

        let merged = match existing {
            Some(existing) => concat(existing, incoming),
            None => incoming,
        };
        let (mut data, duplicates_removed, mut incoming_kept) = dedup(merged, existing_rows);

        self.replace(table_id, &data, previous.as_ref()).await?;
        tracing::debug!("{}: wrote {} rows", table_id, data.len());

        let mut non_numeric_removed = 0;
        if let Some(column) = &policy.numeric_column {
            let written = self.read(table_id).await?;
            let first_incoming = written
                .as_ref()
                .map_or(0, |w| w.len().saturating_sub(incoming_kept));
            let (filtered, removed, incoming_removed) = retain_numeric(
                written.clone().map(normalize).unwrap_or_default(),
                column,
                first_incoming,
            );
            if removed > 0 {
                tracing::warn!(
                    "{}: removing {} rows with non-numeric '{}'",
                    table_id,
                    removed,
                    column
                );
            }
            self.replace(table_id, &filtered, written.as_ref()).await?;
            data = filtered;
            non_numeric_removed = removed;
            incoming_kept = incoming_kept.saturating_sub(incoming_removed);
        }

        let outcome = SyncOutcome {
            table_id: table_id.to_string(),
            data,
            existing_rows,
            incoming_rows,
            incoming_kept,
            duplicates_removed,
            non_numeric_removed,
        };

        tracing::info!(
            "✅ {}: {} rows stored ({} added, {} duplicates skipped)",
            table_id,
            outcome.data.len(),
            outcome.rows_added(),
            duplicates_removed
        );

        Ok(outcome)
    }
}

/// Trims every cell and pads short rows to the header width.
fn normalize(mut data: TableData) -> TableData {
    for cell in data.header.iter_mut() {
        *cell = cell.trim().to_string();
    }
    let width = data.header.len();
    for row in data.rows.iter_mut() {
        for cell in row.iter_mut() {
            *cell = cell.trim().to_string();
        }
        if row.len() < width {
            row.resize(width, String::new());
        }
    }
    data
}

/// Appends `incoming` below `existing`, aligning columns by name. Columns
/// only the incoming data has are added to the right of the existing header.
fn concat(existing: TableData, incoming: TableData) -> TableData {
    let mut header = existing.header.clone();
    for column in &incoming.header {
        if !header.contains(column) {
            header.push(column.clone());
        }
    }

    let realign = |source_header: &[String], row: Vec<String>| -> Vec<String> {
        let mut aligned = vec![String::new(); header.len()];
        for (column, cell) in source_header.iter().zip(row) {
            if let Some(at) = header.iter().position(|h| h == column) {
                if aligned[at].is_empty() {
                    aligned[at] = cell;
                }
            }
        }
        aligned
    };

    let mut rows = Vec::with_capacity(existing.rows.len() + incoming.rows.len());
    for row in existing.rows {
        rows.push(realign(&existing.header, row));
    }
    for row in incoming.rows {
        rows.push(realign(&incoming.header, row));
    }

    TableData { header, rows }
}

/// Keeps the first occurrence of every distinct row, preserving order.
/// Returns the rows removed and how many rows from `first_incoming` on survived.
fn dedup(data: TableData, first_incoming: usize) -> (TableData, usize, usize) {
    let before = data.rows.len();
    let mut seen = HashSet::with_capacity(before);
    let mut incoming_kept = 0;
    let mut rows = Vec::with_capacity(before);
    for (index, row) in data.rows.into_iter().enumerate() {
        if seen.insert(row.clone()) {
            if index >= first_incoming {
                incoming_kept += 1;
            }
            rows.push(row);
        }
    }
    let removed = before - rows.len();
    (
        TableData {
            header: data.header,
            rows,
        },
        removed,
        incoming_kept,
    )
}

fn is_numeric(cell: &str) -> bool {
    cell.trim()
        .parse::<f64>()
        .map(|n| n.is_finite())
        .unwrap_or(false)
}

/// Drops rows whose `column` cell is not a finite number. Also reports how
/// many of the dropped rows sat at or after `first_incoming`.
fn retain_numeric(
    data: TableData,
    column: &str,
    first_incoming: usize,
) -> (TableData, usize, usize) {
    let Some(at) = data.column_index(column) else {
        tracing::warn!("Column '{}' not found, skipping numeric filter", column);
        return (data, 0, 0);
    };
    let before = data.rows.len();
    let mut incoming_removed = 0;
    let mut rows = Vec::with_capacity(before);
    for (index, row) in data.rows.into_iter().enumerate() {
        if row.get(at).is_some_and(|cell| is_numeric(cell)) {
            rows.push(row);
        } else if index >= first_incoming {
            incoming_removed += 1;
        }
    }
    let removed = before - rows.len();
    (
        TableData {
            header: data.header,
            rows,
        },
        removed,
        incoming_removed,
    )
}
