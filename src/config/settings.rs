//! TOML-based configuration for vertiscope.
//!
//! Every section is optional; missing keys fall back to the defaults.
//!
//! Example configuration:
//! ```toml
//! [extractor]
//! native_query_functions = ["Value.NativeQuery", "Odbc.Query"]
//! connection_functions = ["Sql.Database", "Sql.Databases"]
//! statement_keywords = ["SELECT", "WITH", "EXEC"]
//!
//! [log]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Embedded query extraction.
    pub extractor: ExtractorSettings,

    /// Logging.
    pub log: LogSettings,
}

/// Embedded query extraction settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractorSettings {
    /// Functions whose second positional argument is the query literal.
    pub native_query_functions: Vec<String>,

    /// Generic database-connection functions that may carry a query literal.
    pub connection_functions: Vec<String>,

    /// Words a literal may start with to be accepted as a query.
    pub statement_keywords: Vec<String>,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            native_query_functions: vec!["Value.NativeQuery".to_string()],
            connection_functions: vec!["Sql.Database".to_string()],
            statement_keywords: [
                "SELECT", "WITH", "SET", "INSERT", "UPDATE", "DELETE", "MERGE", "CREATE", "DROP",
                "ALTER", "EXEC", "DECLARE",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
        }
    }
}

impl ExtractorSettings {
    /// Check that the keyword list is usable.
    pub fn validate(&self) -> SettingsResult<()> {
        if self.statement_keywords.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "extractor.statement_keywords must not be empty".to_string(),
            ));
        }
        for keyword in &self.statement_keywords {
            let keyword = keyword.trim();
            if keyword.is_empty() || !keyword.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(SettingsError::InvalidConfig(format!(
                    "statement keyword {:?} must be a single word",
                    keyword
                )));
            }
        }
        Ok(())
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SettingsResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.extractor.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `VERTISCOPE_CONFIG`
    /// 2. `./vertiscope.toml`
    /// 3. `~/.config/vertiscope/config.toml`
    pub fn load() -> SettingsResult<Self> {
        if let Ok(path) = env::var("VERTISCOPE_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("vertiscope.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("vertiscope").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }
}
