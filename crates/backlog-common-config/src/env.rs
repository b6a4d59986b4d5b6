//! Environment variable handling.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::BacklogConfig;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names.
pub mod vars {
    // Configuration
    pub const BACKLOG_CONFIG: &str = "BACKLOG_CONFIG";
    pub const BACKLOG_PROJECT_DIR: &str = "BACKLOG_PROJECT_DIR";
    pub const BACKLOG_DEBOUNCE_MS: &str = "BACKLOG_DEBOUNCE_MS";
    pub const BACKLOG_STATE_DIR: &str = "BACKLOG_STATE_DIR";

    // Logging
    pub const BACKLOG_LOG_LEVEL: &str = "BACKLOG_LOG_LEVEL";
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Environment configuration.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Initialize environment from `.env` files in the working directory.
    /// Missing files are not an error.
    pub fn init() -> Result<Self, EnvError> {
        for name in [".env", ".env.local"] {
            match dotenvy::from_filename(name) {
                Ok(_) => {}
                Err(e) if e.not_found() => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Self { _guard: () })
    }

    /// Get an optional string variable. Empty values count as unset.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.trim().is_empty())
    }

    /// Get an integer variable.
    pub fn get_int<T: std::str::FromStr>(var: &str) -> Result<Option<T>, EnvError> {
        match Self::get(var) {
            Some(v) => v.trim().parse().map(Some).map_err(|_| EnvError::InvalidValue {
                var: var.to_string(),
                message: format!("expected integer, got `{v}`"),
            }),
            None => Ok(None),
        }
    }
}

/// Apply `BACKLOG_*` overrides on top of file configuration.
pub fn apply_env_overrides(config: &mut BacklogConfig) -> Result<(), EnvError> {
    if let Some(dir) = Environment::get(vars::BACKLOG_PROJECT_DIR) {
        config.project.root = PathBuf::from(dir);
    }

    if let Some(ms) = Environment::get_int::<u64>(vars::BACKLOG_DEBOUNCE_MS)? {
        config.watch.debounce_ms = ms;
    }

    if let Some(dir) = Environment::get(vars::BACKLOG_STATE_DIR) {
        config.watch.state_dir = Some(PathBuf::from(dir));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_count_as_unset() {
        env::set_var("BACKLOG_TEST_BLANK", "  ");
        assert_eq!(Environment::get("BACKLOG_TEST_BLANK"), None);
        env::set_var("BACKLOG_TEST_BLANK", "projects");
        assert_eq!(Environment::get("BACKLOG_TEST_BLANK").as_deref(), Some("projects"));
        env::remove_var("BACKLOG_TEST_BLANK");
    }

    #[test]
    fn test_integer_parsing() {
        env::set_var("BACKLOG_TEST_INT", "42");
        let val: Result<Option<u64>, _> = Environment::get_int("BACKLOG_TEST_INT");
        assert_eq!(val.unwrap(), Some(42));

        env::set_var("BACKLOG_TEST_INT", "soon");
        let val: Result<Option<u64>, _> = Environment::get_int("BACKLOG_TEST_INT");
        assert!(val.is_err());

        env::remove_var("BACKLOG_TEST_INT");
        let val: Result<Option<u64>, _> = Environment::get_int("BACKLOG_TEST_INT");
        assert_eq!(val.unwrap(), None);
    }

    #[test]
    fn test_environment_init_without_files() {
        assert!(Environment::init().is_ok());
    }

    #[test]
    fn test_apply_overrides() {
        let _env = crate::ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let saved: Vec<(&str, Option<String>)> = [
            vars::BACKLOG_PROJECT_DIR,
            vars::BACKLOG_DEBOUNCE_MS,
            vars::BACKLOG_STATE_DIR,
        ]
        .into_iter()
        .map(|k| (k, env::var(k).ok()))
        .collect();

        env::set_var(vars::BACKLOG_PROJECT_DIR, "/srv/backlog");
        env::set_var(vars::BACKLOG_DEBOUNCE_MS, "125");
        env::remove_var(vars::BACKLOG_STATE_DIR);

        let mut config = BacklogConfig::default();
        apply_env_overrides(&mut config).unwrap();
        assert_eq!(config.project.root, PathBuf::from("/srv/backlog"));
        assert_eq!(config.watch.debounce_ms, 125);
        assert_eq!(config.watch.state_dir, None);

        env::set_var(vars::BACKLOG_DEBOUNCE_MS, "fast");
        let mut config = BacklogConfig::default();
        assert!(matches!(
            apply_env_overrides(&mut config),
            Err(EnvError::InvalidValue { .. })
        ));

        for (key, value) in saved {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}
