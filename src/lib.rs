pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{CsvDirectoryTable, GoogleSheetsTable, MemoryTable, WorkbookReader};
pub use config::toml_config::SyncConfig;
pub use core::{etl::EtlEngine, pipeline::UploadPipeline};
pub use utils::error::{EtlError, Result};
