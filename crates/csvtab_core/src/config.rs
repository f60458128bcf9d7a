//! Shell configuration read from `CSVTAB_*` environment variables.

use crate::logging::{default_log_level, normalize_level, normalize_log_dir, LoggingError};
use crate::plugin::DEFAULT_MAX_PLUGINS;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const MAX_PLUGINS_VAR: &str = "CSVTAB_MAX_PLUGINS";
pub const LOG_LEVEL_VAR: &str = "CSVTAB_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "CSVTAB_LOG_DIR";

const DEFAULT_LOG_DIR_NAME: &str = "csvtab-logs";

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Value is not a positive integer.
    InvalidMaxPlugins(String),
    InvalidLogLevel(LoggingError),
    InvalidLogDir(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMaxPlugins(value) => write!(
                f,
                "{MAX_PLUGINS_VAR} must be a positive integer, got `{value}`"
            ),
            Self::InvalidLogLevel(err) => write!(f, "{LOG_LEVEL_VAR}: {err}"),
            Self::InvalidLogDir(err) => write!(f, "{LOG_DIR_VAR}: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidMaxPlugins(_) => None,
            Self::InvalidLogLevel(err) | Self::InvalidLogDir(err) => Some(err),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for one interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub max_plugins: usize,
    pub log_level: &'static str,
    pub log_dir: PathBuf,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            max_plugins: DEFAULT_MAX_PLUGINS,
            log_level: default_log_level(),
            log_dir: std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME),
        }
    }
}

impl ShellConfig {
    /// Reads the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`; unset or blank variables keep defaults.
    ///
    /// # Errors
    /// - `InvalidMaxPlugins` when the capacity is not a positive integer.
    /// - `InvalidLogLevel` / `InvalidLogDir` when logging settings are rejected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut config = Self::default();
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = read(MAX_PLUGINS_VAR) {
            config.max_plugins = value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|max| *max > 0)
                .ok_or(ConfigError::InvalidMaxPlugins(value))?;
        }
        if let Some(value) = read(LOG_LEVEL_VAR) {
            config.log_level = normalize_level(&value).map_err(ConfigError::InvalidLogLevel)?;
        }
        if let Some(value) = read(LOG_DIR_VAR) {
            config.log_dir = normalize_log_dir(Path::new(value.trim()))
                .map_err(ConfigError::InvalidLogDir)?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ShellConfig, LOG_DIR_VAR, LOG_LEVEL_VAR, MAX_PLUGINS_VAR};
    use crate::logging::default_log_level;
    use crate::plugin::DEFAULT_MAX_PLUGINS;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ShellConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ShellConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]).expect("defaults should load");
        assert_eq!(config.max_plugins, DEFAULT_MAX_PLUGINS);
        assert_eq!(config.log_level, default_log_level());
        assert!(config.log_dir.is_absolute());
        assert!(config.log_dir.ends_with("csvtab-logs"));
    }

    #[test]
    fn reads_all_variables() {
        let dir = tempfile::tempdir().expect("temp dir");
        let dir_text = dir.path().to_str().expect("utf-8 temp dir");
        let config = config_from(&[
            (MAX_PLUGINS_VAR, " 3 "),
            (LOG_LEVEL_VAR, "Warning"),
            (LOG_DIR_VAR, dir_text),
        ])
        .expect("valid config");
        assert_eq!(config.max_plugins, 3);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, dir.path());
    }

    #[test]
    fn blank_values_keep_defaults() {
        let config = config_from(&[(MAX_PLUGINS_VAR, "  "), (LOG_LEVEL_VAR, "")])
            .expect("blank values should be ignored");
        assert_eq!(config.max_plugins, DEFAULT_MAX_PLUGINS);
    }

    #[test]
    fn rejects_invalid_values() {
        for value in ["0", "-1", "many"] {
            let err = config_from(&[(MAX_PLUGINS_VAR, value)]).expect_err("invalid capacity");
            assert_eq!(err, ConfigError::InvalidMaxPlugins(value.to_string()));
        }

        let err = config_from(&[(LOG_LEVEL_VAR, "loud")]).expect_err("invalid level");
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));
        assert!(err.to_string().starts_with(LOG_LEVEL_VAR));

        let err = config_from(&[(LOG_DIR_VAR, "relative/logs")]).expect_err("relative dir");
        assert!(matches!(err, ConfigError::InvalidLogDir(_)));
    }
}
