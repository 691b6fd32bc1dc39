//! Google Sheets (REST v4) backed remote table. The table id is the title of
//! a worksheet inside one spreadsheet.

use crate::domain::ports::RemoteTable;
use crate::utils::error::{EtlError, Result};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://sheets.googleapis.com";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: Vec<&'a [String]>,
}

#[derive(Debug, Clone)]
pub struct GoogleSheetsTable {
    client: Client,
    endpoint: String,
    spreadsheet_id: String,
    access_token: String,
}

impl GoogleSheetsTable {
    pub fn new(
        endpoint: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            spreadsheet_id: spreadsheet_id.into(),
            access_token: access_token.into(),
        }
    }

    /// `.../v4/spreadsheets/{id}/values/{range}{suffix}`
    fn values_url(&self, table_id: &str, range: &str, suffix: &str) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| EtlError::sync(table_id, format!("invalid endpoint: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| EtlError::sync(table_id, "endpoint cannot be a base URL"))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values"])
            .push(&format!("{}{}", range, suffix));
        Ok(url)
    }

    async fn check(table_id: &str, action: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(EtlError::sync(
            table_id,
            format!("{} rejected with HTTP {}: {}", action, status, body.trim()),
        ))
    }
}

/// Whole-sheet range in A1 notation.
fn sheet_range(table_id: &str) -> String {
    format!("'{}'", table_id.replace('\'', "''"))
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl RemoteTable for GoogleSheetsTable {
    async fn read_all(&self, table_id: &str) -> Result<Vec<Vec<String>>> {
        let mut url = self.values_url(table_id, &sheet_range(table_id), "")?;
        // Locale formatting would change cells between uploads and defeat dedup.
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE")
            .append_pair("dateTimeRenderOption", "FORMATTED_STRING");
        tracing::debug!("Reading sheet '{}' from {}", table_id, url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| EtlError::sync(table_id, format!("read failed: {}", e)))?;
        let response = Self::check(table_id, "read", response).await?;

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| EtlError::sync(table_id, format!("unexpected read payload: {}", e)))?;

        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn clear(&self, table_id: &str) -> Result<()> {
        let url = self.values_url(table_id, &sheet_range(table_id), ":clear")?;
        tracing::debug!("Clearing sheet '{}'", table_id);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| EtlError::sync(table_id, format!("clear failed: {}", e)))?;
        Self::check(table_id, "clear", response).await?;
        Ok(())
    }

    async fn write_all(&self, table_id: &str, header: &[String], rows: &[Vec<String>]) -> Result<()> {
        let range = format!("{}!A1", sheet_range(table_id));
        let mut url = self.values_url(table_id, &range, "")?;
        // RAW keeps every cell the exact string sent, so re-reads compare equal
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = ValueRangeBody {
            range: &range,
            major_dimension: "ROWS",
            values: std::iter::once(header)
                .chain(rows.iter().map(Vec::as_slice))
                .collect(),
        };
        tracing::debug!("Writing {} rows to sheet '{}'", rows.len() + 1, table_id);

        let response = self
            .client
            .put(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| EtlError::sync(table_id, format!("write failed: {}", e)))?;
        Self::check(table_id, "write", response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_range_quotes_sheet_titles() {
        assert_eq!(sheet_range("METAS"), "'METAS'");
        assert_eq!(sheet_range("Loja's"), "'Loja''s'");
    }

    #[test]
    fn test_values_url_layout() {
        let table = GoogleSheetsTable::new("https://sheets.example.com/", "abc123", "token");
        let url = table.values_url("METAS", "'METAS'", ":clear").unwrap();
        assert!(url
            .as_str()
            .starts_with("https://sheets.example.com/v4/spreadsheets/abc123/values/"));
        assert!(url.as_str().ends_with(":clear"));
    }

    #[tokio::test]
    async fn test_read_all_returns_rows_as_text() {
        let server = MockServer::start();
        let read_mock = server.mock(|when, then| {
            when.method(GET)
                .path_contains("/v4/spreadsheets/sheet-1/values/")
                .header("authorization", "Bearer secret");
            then.status(200).json_body(serde_json::json!({
                "range": "METAS!A1:E3",
                "majorDimension": "ROWS",
                "values": [
                    ["month", "store", "goal1"],
                    ["03/2024", "SPLT", 1000]
                ]
            }));
        });

        let table = GoogleSheetsTable::new(server.base_url(), "sheet-1", "secret");
        let rows = table.read_all("METAS").await.unwrap();

        read_mock.assert();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["03/2024", "SPLT", "1000"]);
    }

    #[tokio::test]
    async fn test_read_all_requests_unformatted_values() {
        let server = MockServer::start();
        let read_mock = server.mock(|when, then| {
            when.method(GET)
                .path_contains("/values/")
                .query_param("valueRenderOption", "UNFORMATTED_VALUE")
                .query_param("dateTimeRenderOption", "FORMATTED_STRING");
            then.status(200).json_body(serde_json::json!({
                "values": [["value"], [25.5], [1000]]
            }));
        });

        let table = GoogleSheetsTable::new(server.base_url(), "sheet-1", "secret");
        let rows = table.read_all("MOVIMENTAÇÃO").await.unwrap();

        read_mock.assert();
        assert_eq!(rows, vec![vec!["value"], vec!["25.5"], vec!["1000"]]);
    }

    #[tokio::test]
    async fn test_stored_rows_match_the_same_upload() {
        use crate::core::reconcile::{Reconciler, SyncPolicy};
        use crate::domain::model::TableData;

        let server = MockServer::start();
        // What Sheets hands back for rows this crate wrote earlier.
        let read_mock = server.mock(|when, then| {
            when.method(GET)
                .path_contains("/values/")
                .query_param("valueRenderOption", "UNFORMATTED_VALUE");
            then.status(200).json_body(serde_json::json!({
                "values": [
                    ["date", "month", "store", "payment_method", "value"],
                    ["2024-03-01", "03/2024", "SPLT", "PIX", 150],
                    ["2024-03-02", "03/2024", "SPLT", "CASH", 25.5]
                ]
            }));
        });
        server.mock(|when, then| {
            when.method(POST).path_contains(":clear");
            then.status(200).json_body(serde_json::json!({}));
        });
        let write_mock = server.mock(|when, then| {
            when.method(PUT)
                .path_contains("/values/")
                .query_param("valueInputOption", "RAW");
            then.status(200).json_body(serde_json::json!({}));
        });

        let incoming = TableData {
            header: ["date", "month", "store", "payment_method", "value"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rows: vec![
                ["2024-03-01", "03/2024", "SPLT", "PIX", "150"],
                ["2024-03-02", "03/2024", "SPLT", "CASH", "25.5"],
            ]
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
        };

        let table = GoogleSheetsTable::new(server.base_url(), "sheet-1", "secret");
        let outcome = Reconciler::new(&table)
            .sync("MOVIMENTAÇÃO", incoming, &SyncPolicy::numeric("value"))
            .await
            .unwrap();

        read_mock.assert_hits(2);
        write_mock.assert_hits(2);
        assert_eq!(outcome.duplicates_removed, 2);
        assert_eq!(outcome.non_numeric_removed, 0);
        assert_eq!(outcome.rows_added(), 0);
        assert_eq!(outcome.data.len(), 2);
    }

    #[tokio::test]
    async fn test_read_all_of_empty_sheet() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(200)
                .json_body(serde_json::json!({"range": "METAS!A1:Z1000", "majorDimension": "ROWS"}));
        });

        let table = GoogleSheetsTable::new(server.base_url(), "sheet-1", "secret");
        assert!(table.read_all("METAS").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_all_sends_header_and_rows() {
        let server = MockServer::start();
        let write_mock = server.mock(|when, then| {
            when.method(PUT)
                .path_contains("/values/")
                .query_param("valueInputOption", "RAW")
                .json_body(serde_json::json!({
                    "range": "'METAS'!A1",
                    "majorDimension": "ROWS",
                    "values": [["month", "store"], ["03/2024", "SPLT"]]
                }));
            then.status(200).json_body(serde_json::json!({"updatedRows": 2}));
        });

        let table = GoogleSheetsTable::new(server.base_url(), "sheet-1", "secret");
        let header = vec!["month".to_string(), "store".to_string()];
        let rows = vec![vec!["03/2024".to_string(), "SPLT".to_string()]];
        table.write_all("METAS", &header, &rows).await.unwrap();

        write_mock.assert();
    }

    #[tokio::test]
    async fn test_clear_posts_to_clear_endpoint() {
        let server = MockServer::start();
        let clear_mock = server.mock(|when, then| {
            when.method(POST).path_contains(":clear");
            then.status(200).json_body(serde_json::json!({}));
        });

        let table = GoogleSheetsTable::new(server.base_url(), "sheet-1", "secret");
        table.clear("METAS").await.unwrap();
        clear_mock.assert();
    }

    #[tokio::test]
    async fn test_rejected_write_is_sync_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT);
            then.status(403).body("The caller does not have permission");
        });

        let table = GoogleSheetsTable::new(server.base_url(), "sheet-1", "secret");
        let err = table.write_all("METAS", &[], &[]).await.unwrap_err();

        match err {
            EtlError::SyncError { table, message } => {
                assert_eq!(table, "METAS");
                assert!(message.contains("403"));
                assert!(message.contains("permission"));
            }
            other => panic!("expected SyncError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_store_is_sync_error() {
        let table = GoogleSheetsTable::new("http://127.0.0.1:9", "sheet-1", "secret");
        assert!(matches!(
            table.read_all("METAS").await,
            Err(EtlError::SyncError { .. })
        ));
    }
}
