//! Runtime configuration for the assembly services.
//!
//! Configuration is read from a TOML document. Every section and key is
//! optional; missing values fall back to the defaults below.
//!
//! ```toml
//! [provisioning]
//! default_stage_id = "default"
//! default_stage_suffix = "assembly"
//!
//! [summary]
//! overdue_list_limit = 5
//! overdue_ranking = "store_order"
//!
//! [replacement]
//! order_type = "glass"
//! unit = "piece"
//!
//! [logging]
//! level = "info"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssemblyConfig {
    /// Task provisioning settings.
    pub provisioning: ProvisioningSettings,
    /// Dashboard summary settings.
    pub summary: SummarySettings,
    /// Replacement order settings.
    pub replacement: ReplacementSettings,
    /// Log output settings.
    pub logging: LoggingSettings,
}

/// Settings for provisioning roles without a stage template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisioningSettings {
    /// Stage identifier used when a role has no configured stages.
    pub default_stage_id: String,
    /// Suffix appended to the role name to build the default stage name.
    pub default_stage_suffix: String,
}

impl Default for ProvisioningSettings {
    fn default() -> Self {
        Self {
            default_stage_id: "default".to_owned(),
            default_stage_suffix: "assembly".to_owned(),
        }
    }
}

/// Ordering of the overdue list in the dashboard summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverdueRanking {
    /// Keep the order the store returns tasks in.
    #[default]
    StoreOrder,
    /// Oldest estimated date first.
    MostOverdueFirst,
}

/// Settings for the global dashboard summary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummarySettings {
    /// Maximum number of overdue tasks listed.
    pub overdue_list_limit: usize,
    /// Ordering applied before the list is truncated.
    pub overdue_ranking: OverdueRanking,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            overdue_list_limit: 5,
            overdue_ranking: OverdueRanking::StoreOrder,
        }
    }
}

/// Settings for replacement order requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplacementSettings {
    /// Production order type requested for replacements.
    pub order_type: String,
    /// Unit of measure for replacement line items.
    pub unit: String,
}

impl Default for ReplacementSettings {
    fn default() -> Self {
        Self {
            order_type: "glass".to_owned(),
            unit: "piece".to_owned(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `ASSEMBLY_LOG`.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not valid TOML or has unexpected keys.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is syntactically valid but unusable.
    #[error("invalid configuration value for {key}: {reason}")]
    Invalid {
        /// Dotted key path of the offending value.
        key: &'static str,
        /// Why the value was refused.
        reason: &'static str,
    },
}

impl AssemblyConfig {
    /// Loads configuration from `path`, or returns the defaults when no path
    /// is given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, does not parse,
    /// or holds unusable values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(file) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(file).map_err(|source| ConfigError::Read {
            path: file.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed documents and
    /// [`ConfigError::Invalid`] for unusable values.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.provisioning.default_stage_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "provisioning.default_stage_id",
                reason: "must not be empty",
            });
        }
        if self.summary.overdue_list_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "summary.overdue_list_limit",
                reason: "must be at least 1",
            });
        }
        if self.replacement.order_type.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "replacement.order_type",
                reason: "must not be empty",
            });
        }
        Ok(())
    }
}
