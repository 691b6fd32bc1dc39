pub mod layout;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::toml_config::{RemoteBackend, SyncConfig};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "store-sheets-sync")]
#[command(about = "Upload a store movement workbook into the goals and movements tables")]
pub struct CliConfig {
    /// Workbook to upload (.xlsx, .xlsm, .xlsb, .xls or .ods)
    pub workbook: PathBuf,

    /// TOML file with layout and remote settings; built-in defaults when absent
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write to CSV files in this directory instead of Google Sheets
    #[arg(long)]
    pub csv_dir: Option<String>,

    #[arg(long, env = "SHEETS_SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    #[arg(long, env = "SHEETS_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Show what would be uploaded without writing to the remote tables
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage per stage")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Command line values win over the configuration file.
    pub fn apply_to(&self, config: &mut SyncConfig) {
        if let Some(dir) = &self.csv_dir {
            config.remote.backend = RemoteBackend::Csv;
            config.remote.directory = Some(dir.clone());
        }
        if let Some(id) = &self.spreadsheet_id {
            config.remote.spreadsheet_id = Some(id.clone());
        }
        if let Some(token) = &self.access_token {
            config.remote.access_token = Some(token.clone());
        }
    }
}
