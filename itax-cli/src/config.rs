//! `itax.toml` settings.
//!
//! ```toml
//! assessment_year = 2025
//! output = "table"
//!
//! [database]
//! backend = "sqlite"
//! connection_string = "itax.db"
//!
//! [logging]
//! level = "info"
//! file = "itax.log"
//! ```
//!
//! Every key is optional. Command-line flags override the file.

use std::path::{Path, PathBuf};

use itax_core::{DEFAULT_ASSESSMENT_YEAR, DbConfig};
use serde::Deserialize;
use thiserror::Error;

use crate::output::OutputFormat;

/// Looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "itax.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSettings {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        let DbConfig {
            backend,
            connection_string,
        } = DbConfig::default();
        Self {
            backend,
            connection_string,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Bare level or full `EnvFilter` directive.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub assessment_year: i32,
    pub output: OutputFormat,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            assessment_year: DEFAULT_ASSESSMENT_YEAR,
            output: OutputFormat::default(),
            database: DatabaseSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Values given on the command line; `None` keeps the file's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub backend: Option<String>,
    pub connection_string: Option<String>,
    pub assessment_year: Option<i32>,
    pub output: Option<OutputFormat>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Reads `explicit` if given, otherwise `./itax.toml` when present,
    /// otherwise returns the defaults.
    ///
    /// An explicit path that cannot be read is an error; a missing
    /// `./itax.toml` is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply(
        mut self,
        overrides: Overrides,
    ) -> Self {
        if let Some(backend) = overrides.backend {
            self.database.backend = backend;
        }
        if let Some(connection_string) = overrides.connection_string {
            self.database.connection_string = connection_string;
        }
        if let Some(year) = overrides.assessment_year {
            self.assessment_year = year;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(file) = overrides.log_file {
            self.logging.file = Some(file);
        }
        self
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.backend, &self.database.connection_string)
    }
}
