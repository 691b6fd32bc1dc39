use anyhow::Context;
use clap::Parser;
use store_sheets_sync::config::toml_config::RemoteBackend;
use store_sheets_sync::core::reconcile::SyncReport;
use store_sheets_sync::core::{ConfigProvider, RemoteTable};
use store_sheets_sync::domain::model::UploadBatch;
use store_sheets_sync::utils::error::ErrorSeverity;
use store_sheets_sync::utils::validation::{validate_file_extension, Validate, WORKBOOK_EXTENSIONS};
use store_sheets_sync::utils::logger;
use store_sheets_sync::{
    CliConfig, CsvDirectoryTable, EtlEngine, EtlError, GoogleSheetsTable, SyncConfig,
    UploadPipeline,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting store-sheets-sync");

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            SyncConfig::from_file(path)
                .with_context(|| format!("failed to load config file '{}'", path.display()))?
        }
        None => SyncConfig::default(),
    };
    cli.apply_to(&mut config);

    let checked = config
        .validate()
        .and_then(|_| validate_file_extension("workbook", &cli.workbook, WORKBOOK_EXTENSIONS));
    if let Err(e) = checked {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = cli.monitor || config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let outcome = match config.remote.backend {
        RemoteBackend::GoogleSheets => {
            // validate() has already required both values
            let table = GoogleSheetsTable::new(
                config.remote.endpoint(),
                config.remote.spreadsheet_id.clone().unwrap_or_default(),
                config.remote.access_token.clone().unwrap_or_default(),
            );
            execute(table, config, &cli, monitor_enabled).await
        }
        RemoteBackend::Csv => {
            let table = CsvDirectoryTable::new(config.remote.directory.clone().unwrap_or_default());
            execute(table, config, &cli, monitor_enabled).await
        }
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Upload failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn execute<T: RemoteTable>(
    table: T,
    config: SyncConfig,
    cli: &CliConfig,
    monitor_enabled: bool,
) -> Result<(), EtlError> {
    display_config_summary(&config, cli);

    let pipeline = UploadPipeline::new(&cli.workbook, table, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - remote tables are read but not written");
        let batch = engine.preview().await?;
        let report = engine.pipeline().rehearse(batch.clone()).await?;
        print_dry_run(&batch, &report);
        return Ok(());
    }

    let report = engine.run().await?;
    tracing::info!("✅ Upload completed successfully!");
    println!("✅ Upload completed successfully!");
    print_report(&report);
    Ok(())
}

fn display_config_summary(config: &SyncConfig, cli: &CliConfig) {
    println!("📋 Configuration Summary:");
    println!("  Pipeline: {}", config.pipeline.name);
    println!("  Workbook: {}", cli.workbook.display());
    match config.remote.backend {
        RemoteBackend::GoogleSheets => println!(
            "  Remote: Google Sheets {} ({})",
            config.remote.spreadsheet_id.as_deref().unwrap_or("?"),
            config.remote.endpoint()
        ),
        RemoteBackend::Csv => println!(
            "  Remote: CSV directory {}",
            config.remote.directory.as_deref().unwrap_or("?")
        ),
    }
    println!(
        "  Tables: {} / {}",
        config.goals_table(),
        config.movements_table()
    );
    let sheets: Vec<&str> = config
        .layout()
        .movement_sheets
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    println!("  Movement sheets: {}", sheets.join(", "));
    if cli.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}

fn print_report(report: &SyncReport) {
    for outcome in [&report.goals, &report.movements] {
        println!(
            "  {}: {} rows ({} added, {} duplicates skipped, {} non-numeric removed)",
            outcome.table_id,
            outcome.data.len(),
            outcome.rows_added(),
            outcome.duplicates_removed,
            outcome.non_numeric_removed
        );
    }
}

fn print_dry_run(batch: &UploadBatch, report: &SyncReport) {
    println!("🔍 Dry Run Analysis:");
    println!("  Month: {}", batch.month);
    println!();
    println!("🎯 Goals:");
    for goal in &batch.goals {
        println!(
            "  {:<8} {} / {} / {}",
            goal.store, goal.goal1, goal.goal2, goal.goal3
        );
    }
    println!();
    println!("📄 Movements: {}", batch.movements.len());
    if batch.dropped_dates > 0 {
        println!("  ⚠️ {} rows dropped (day not in {})", batch.dropped_dates, batch.month);
    }
    println!();
    println!("💾 Would write:");
    print_report(report);
    println!();
    println!("✅ Dry run complete. Nothing was written.");
}
