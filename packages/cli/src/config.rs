//! Dashboard configuration loaded from `dashboard.toml`.
//!
//! The default file is baked into the binary via [`include_str!`]; a file
//! passed with `--config` replaces it entirely. Missing tables and keys fall
//! back to their defaults.

use std::path::{Path, PathBuf};

use enforcement_dash_analytics_models::{OptionsPolicy, ViewPolicy};
use enforcement_dash_dataset::config::DatasetSources;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG: &str = include_str!("../dashboard.toml");

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`DashboardConfig`].
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Everything the dashboard reads from `dashboard.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Where the four CSV files live.
    pub datasets: DatasetSources,
    /// Which dimensions are offered as filters.
    pub options: OptionsPolicy,
    /// Tunables for the per-tab recipes.
    pub views: ViewPolicy,
}

impl DashboardConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// The embedded default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the embedded file is invalid.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Loads `path` if given, otherwise the embedded default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Self::embedded();
        };

        log::debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use enforcement_dash_analytics_models::Dimension;
    use enforcement_dash_dataset_models::DatasetKind;

    use super::*;

    #[test]
    fn embedded_config_matches_defaults() {
        assert_eq!(DashboardConfig::embedded().unwrap(), DashboardConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = DashboardConfig::from_toml(
            "[datasets]\ndata_dir = \"/srv/police\"\n\n[options.min_cardinality]\nyear = 5\n",
        )
        .unwrap();

        assert_eq!(
            config.datasets.path_for(DatasetKind::Fines),
            PathBuf::from("/srv/police/police_enforcement_2023_fines_2024-09-20.csv")
        );
        assert_eq!(config.options.min_cardinality(Dimension::Year), 5);
        assert_eq!(config.options.min_cardinality(Dimension::AgeGroup), 2);
        assert_eq!(config.views, ViewPolicy::default());
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = DashboardConfig::from_toml("[views]\nexcluded_keys = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = DashboardConfig::load(Some(Path::new("/does/not/exist.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/does/not/exist.toml"));
    }
}
