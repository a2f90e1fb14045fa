//! Dashboard configuration (`fanta-dash.toml`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "fanta-dash.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    Validation { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config sections
// ---------------------------------------------------------------------------

/// Semantic column names as they appear in the analysis outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub name: String,
    pub role: String,
    pub team: String,
    pub convenience: String,
    pub potential_convenience: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            name: "Nome".to_string(),
            role: "Ruolo".to_string(),
            team: "Squadra".to_string(),
            convenience: "Convenienza".to_string(),
            potential_convenience: "Convenienza Potenziale".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Rows in the "top players" tables.
    pub top_players: usize,
    /// Teams shown in team rollups.
    pub top_teams: usize,
    pub decimal_places: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            top_players: 15,
            top_teams: 10,
            decimal_places: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// How many rows by potential convenience are searched for a hidden gem.
    pub hidden_gem_pool: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { hidden_gem_pool: 20 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub left_suffix: String,
    pub right_suffix: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            left_suffix: "_current".to_string(),
            right_suffix: "_previous".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    /// Current-season projections, relative to `data_dir`.
    pub current_file: String,
    /// Previous-season statistics, relative to `data_dir`.
    pub previous_file: String,
    pub columns: ColumnNames,
    pub display: DisplayConfig,
    pub analysis: AnalysisConfig,
    pub merge: MergeConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/output"),
            current_file: "current.parquet".to_string(),
            previous_file: "previous.csv".to_string(),
            columns: ColumnNames::default(),
            display: DisplayConfig::default(),
            analysis: AnalysisConfig::default(),
            merge: MergeConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: DashboardConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text, path)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn current_path(&self) -> PathBuf {
        self.data_dir.join(&self.current_file)
    }

    pub fn previous_path(&self) -> PathBuf {
        self.data_dir.join(&self.previous_file)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let cols = &self.columns;
        for (field, value) in [
            ("columns.name", &cols.name),
            ("columns.role", &cols.role),
            ("columns.team", &cols.team),
            ("columns.convenience", &cols.convenience),
            ("columns.potential_convenience", &cols.potential_convenience),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: field.to_string(),
                    message: "column name must not be empty".to_string(),
                });
            }
        }
        for (field, value) in [
            ("display.top_players", self.display.top_players),
            ("display.top_teams", self.display.top_teams),
            ("analysis.hidden_gem_pool", self.analysis.hidden_gem_pool),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation {
                    field: field.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }
}
