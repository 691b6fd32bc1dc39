use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Workbook could not be read: {0}")]
    WorkbookError(#[from] calamine::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Schema error in sheet '{sheet}': {message}")]
    SchemaError { sheet: String, message: String },

    #[error("Sync error on table '{table}': {message}")]
    SyncError { table: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Workbook,
    RemoteStore,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn schema(sheet: impl Into<String>, message: impl Into<String>) -> Self {
        EtlError::SchemaError {
            sheet: sheet.into(),
            message: message.into(),
        }
    }

    pub fn sync(table: impl Into<String>, message: impl Into<String>) -> Self {
        EtlError::SyncError {
            table: table.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::WorkbookError(_) | EtlError::SchemaError { .. } => ErrorCategory::Workbook,
            EtlError::SyncError { .. } => ErrorCategory::RemoteStore,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::CsvError(_) | EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::RemoteStore => ErrorSeverity::Medium,
            ErrorCategory::Workbook | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Pipeline stage the failure belongs to, used in run-level messages.
    pub fn stage(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Workbook => "workbook extraction",
            ErrorCategory::RemoteStore => "remote synchronization",
            ErrorCategory::System => "system",
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::WorkbookError(_) => {
                "Check that the file is a readable xlsx/xls/ods workbook".to_string()
            }
            EtlError::SchemaError { sheet, .. } => format!(
                "Compare sheet '{}' with the configured layout (cell positions, sheet names)",
                sheet
            ),
            EtlError::SyncError { table, .. } => format!(
                "Verify the remote store is reachable and table '{}' exists; the upload can be repeated safely",
                table
            ),
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Review the TOML configuration and command line options".to_string()
            }
            EtlError::CsvError(_) | EtlError::IoError(_) => {
                "Check file permissions and available disk space".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        format!("Upload failed during {}: {}", self.stage(), self)
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
