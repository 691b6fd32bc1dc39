use crate::adapters::sheets::DEFAULT_ENDPOINT;
use crate::config::layout::WorkbookLayout;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub pipeline: PipelineInfo,
    #[serde(default)]
    pub workbook: WorkbookLayout,
    #[serde(default)]
    pub remote: RemoteConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineInfo {
    pub name: String,
    pub description: Option<String>,
}

impl Default for PipelineInfo {
    fn default() -> Self {
        Self {
            name: "store-sheets-sync".to_string(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteBackend {
    GoogleSheets,
    Csv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub backend: RemoteBackend,
    pub goals_table: String,
    pub movements_table: String,
    pub endpoint: Option<String>,
    pub spreadsheet_id: Option<String>,
    pub access_token: Option<String>,
    pub directory: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            backend: RemoteBackend::GoogleSheets,
            goals_table: "METAS".to_string(),
            movements_table: "MOVIMENTAÇÃO".to_string(),
            endpoint: None,
            spreadsheet_id: None,
            access_token: None,
            directory: None,
        }
    }
}

impl RemoteConfig {
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl SyncConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_non_empty_string("remote.goals_table", &self.remote.goals_table)?;
        validate_non_empty_string("remote.movements_table", &self.remote.movements_table)?;
        if self.remote.goals_table == self.remote.movements_table {
            return Err(EtlError::InvalidConfigValueError {
                field: "remote.movements_table".to_string(),
                value: self.remote.movements_table.clone(),
                reason: "goals and movements must target different tables".to_string(),
            });
        }

        match self.remote.backend {
            RemoteBackend::GoogleSheets => {
                validate_url("remote.endpoint", self.remote.endpoint())?;
                let id = validate_required_field("remote.spreadsheet_id", &self.remote.spreadsheet_id)?;
                validate_non_empty_string("remote.spreadsheet_id", id)?;
                let token = validate_required_field("remote.access_token", &self.remote.access_token)?;
                validate_resolved("remote.access_token", token)?;
            }
            RemoteBackend::Csv => {
                let dir = validate_required_field("remote.directory", &self.remote.directory)?;
                validate_path("remote.directory", dir)?;
            }
        }

        if self.workbook.summary.stores.is_empty() {
            return Err(EtlError::InvalidConfigValueError {
                field: "workbook.summary.stores".to_string(),
                value: "[]".to_string(),
                reason: "at least one store slot is required".to_string(),
            });
        }

        let mut names = HashSet::new();
        for sheet in &self.workbook.movement_sheets {
            validate_non_empty_string("workbook.movement_sheets.name", &sheet.name)?;
            if !names.insert(sheet.name.as_str()) {
                return Err(EtlError::InvalidConfigValueError {
                    field: "workbook.movement_sheets".to_string(),
                    value: sheet.name.clone(),
                    reason: "sheet listed twice".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for SyncConfig {
    fn layout(&self) -> &WorkbookLayout {
        &self.workbook
    }

    fn goals_table(&self) -> &str {
        &self.remote.goals_table
    }

    fn movements_table(&self) -> &str {
        &self.remote.movements_table
    }
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// A `${VAR}` left in place means the variable was not set.
fn validate_resolved(field: &str, value: &str) -> Result<()> {
    crate::utils::validation::validate_non_empty_string(field, value)?;
    if value.starts_with("${") && value.ends_with('}') {
        return Err(EtlError::MissingConfigError {
            field: format!("{} (environment variable {})", field, value),
        });
    }
    Ok(())
}
