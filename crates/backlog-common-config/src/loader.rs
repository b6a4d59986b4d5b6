//! Configuration file loading and parsing.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::env::{apply_env_overrides, EnvError};
use crate::types::BacklogConfig;

/// Directory holding the config file, relative to the working directory.
pub const CONFIG_DIR: &str = ".backlog";
/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.yaml";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error(transparent)]
    Env(#[from] EnvError),
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given working directory.
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the config file this loader reads.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load `.backlog/config.yaml`, falling back to defaults when absent.
    /// Environment overrides are applied either way.
    pub fn load(&self) -> Result<BacklogConfig, ConfigError> {
        let config_path = self.config_path();

        let mut config = if config_path.exists() {
            self.parse_file(&config_path)?
        } else {
            BacklogConfig::default()
        };

        apply_env_overrides(&mut config)?;
        self.validate(&config)?;
        Ok(config)
    }

    /// Load an explicitly named config file. Unlike [`load`](Self::load),
    /// a missing file is an error.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<BacklogConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let mut config = self.parse_file(path)?;
        apply_env_overrides(&mut config)?;
        self.validate(&config)?;
        Ok(config)
    }

    fn parse_file(&self, path: &Path) -> Result<BacklogConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let expanded = self.expand_env_vars(&contents)?;

        serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let re = regex::Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").map_err(|e| {
            ConfigError::ParseError {
                line: None,
                message: e.to_string(),
            }
        })?;

        let mut result = content.to_string();
        for cap in re.captures_iter(content) {
            let Some(full_match) = cap.get(0) else {
                continue;
            };
            let var_name = &cap[1];
            let default = cap.get(2).map(|m| m.as_str());

            let value = match std::env::var(var_name) {
                Ok(v) => v,
                Err(_) => match default {
                    Some(d) => d.to_string(),
                    None => {
                        return Err(ConfigError::EnvVarNotFound {
                            var: var_name.to_string(),
                        })
                    }
                },
            };

            result = result.replace(full_match.as_str(), &value);
        }

        Ok(result)
    }

    /// Validate configuration values.
    fn validate(&self, config: &BacklogConfig) -> Result<(), ConfigError> {
        let names = [
            ("project.epic_dir", &config.project.epic_dir),
            ("project.issues_dir", &config.project.issues_dir),
            ("project.priority_file", &config.project.priority_file),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: format!("{field} must not be empty"),
                });
            }
            if value.contains(['/', '\\']) {
                return Err(ConfigError::ValidationError {
                    message: format!("{field} must be a plain name, got `{value}`"),
                });
            }
        }

        if config.project.epic_dir == config.project.issues_dir {
            return Err(ConfigError::ValidationError {
                message: "project.epic_dir and project.issues_dir must differ".to_string(),
            });
        }

        if config.watch.debounce_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "watch.debounce_ms must be greater than 0".to_string(),
            });
        }

        if config.watch.lease_poll_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "watch.lease_poll_ms must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
