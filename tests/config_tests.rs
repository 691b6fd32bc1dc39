mod common;

use common::{row, write_workbook, Cell, MovementSheet};
use std::io::Write;
use store_sheets_sync::config::toml_config::RemoteBackend;
use store_sheets_sync::utils::validation::Validate;
use store_sheets_sync::{CsvDirectoryTable, EtlEngine, MemoryTable, SyncConfig, UploadPipeline};
use tempfile::{NamedTempFile, TempDir};

#[tokio::test]
async fn test_custom_layout_from_toml_file() {
    let dir = TempDir::new().unwrap();
    let remote = dir.path().join("remote");

    let toml_content = format!(
        r#"
[pipeline]
name = "duas-lojas"

[workbook]
movement_sheets = [
    {{ name = "SPLT", drop_columns = ["DISCRI", "NOME"] }},
    {{ name = "KONI" }},
]

[remote]
backend = "csv"
goals_table = "goals"
movements_table = "movements"
directory = "{}"
"#,
        remote.display().to_string().replace('\\', "/")
    );
    let mut config_file = NamedTempFile::new().unwrap();
    config_file.write_all(toml_content.as_bytes()).unwrap();

    let config = SyncConfig::from_file(config_file.path()).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.remote.backend, RemoteBackend::Csv);
    assert_eq!(config.workbook.movement_sheets.len(), 2);

    let workbook = dir.path().join("duas.xlsx");
    let sheets = vec![
        MovementSheet {
            name: "SPLT",
            header: vec!["DIA", "DISCRI", "PIX"],
            rows: vec![vec![Cell::N(3.0), Cell::T("x"), Cell::N(12.0)]],
        },
        MovementSheet {
            name: "KONI",
            header: vec!["DIA", "CARTAO"],
            rows: vec![vec![Cell::N(4.0), Cell::N(7.0)]],
        },
    ];
    write_workbook(&workbook, "05/2024", common::standard_goals(), &sheets).unwrap();

    let table = CsvDirectoryTable::new(config.remote.directory.clone().unwrap());
    let engine = EtlEngine::new(UploadPipeline::new(&workbook, table, config));
    let report = engine.run().await.unwrap();

    assert_eq!(report.movements.table_id, "movements");
    assert_eq!(
        report.movements.data.rows,
        vec![
            row(&["2024-05-03", "05/2024", "SPLT", "PIX", "12"]),
            row(&["2024-05-04", "05/2024", "KONI", "CARTAO", "7"]),
        ]
    );
    assert!(remote.join("goals.csv").exists());
    assert!(remote.join("movements.csv").exists());
}

#[tokio::test]
async fn test_moved_summary_cells() {
    let dir = TempDir::new().unwrap();
    let workbook = dir.path().join("resumo.xlsx");
    write_workbook(
        &workbook,
        "06/2024",
        [(1.0, 2.0, 3.0), (4.0, 5.0, 6.0), (7.0, 8.0, 9.0), (10.0, 11.0, 12.0)],
        &[],
    )
    .unwrap();

    // Only the second store, with goals read in reverse order.
    let config = SyncConfig::from_toml_str(
        r#"
[workbook]
movement_sheets = []

[workbook.summary]
month = { row = 0, col = 3 }

[[workbook.summary.stores]]
name = { row = 1, col = 5 }
goals = [{ row = 26, col = 7 }, { row = 22, col = 7 }, { row = 18, col = 7 }]
"#,
    )
    .unwrap();

    let engine = EtlEngine::new(UploadPipeline::new(&workbook, MemoryTable::new(), config));
    let batch = engine.preview().await.unwrap();

    assert_eq!(batch.goals.len(), 1);
    assert_eq!(batch.goals[0].store, "TLPS");
    assert_eq!(
        (batch.goals[0].goal1, batch.goals[0].goal2, batch.goals[0].goal3),
        (6.0, 5.0, 4.0)
    );
    assert!(batch.movements.is_empty());
}
