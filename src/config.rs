//! Relay configuration.
//!
//! The plugin runs inside the simulator without a command line, so settings
//! come from an optional YAML file named by the `RFSHARED_CONFIG` environment
//! variable. Every field has a default; an absent file means defaults.
//!
//! ```yaml
//! region_name: "$rFactorShared$"
//! log_filter: "rfshared=debug"
//! extrapolation:
//!   rotation_damping: 0.05
//!   velocity_damping: 1.0
//!   max_elapsed_secs: 0.55
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::extrapolation::ExtrapolationConfig;
use crate::region::DEFAULT_REGION_NAME;
use crate::{RelayError, Result};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "RFSHARED_CONFIG";

/// Filter used when neither the configuration nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    /// Name of the shared region.
    pub region_name: String,
    /// `tracing_subscriber::EnvFilter` directives.
    pub log_filter: String,
    pub extrapolation: ExtrapolationConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            region_name: DEFAULT_REGION_NAME.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            extrapolation: ExtrapolationConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: RelayConfig = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Reading relay config {}", path.display()))?;
        let config = Self::from_yaml(&yaml)
            .with_context(|| format!("Parsing relay config {}", path.display()))?;
        debug!(path = %path.display(), "Loaded relay config");
        Ok(config)
    }

    /// Load the file named by [`CONFIG_ENV`], or defaults when it is unset.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::load_optional(std::env::var_os(CONFIG_ENV).map(PathBuf::from))
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load_optional(path: Option<PathBuf>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.region_name.trim().is_empty() {
            return Err(RelayError::config("region_name must not be empty"));
        }
        self.extrapolation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrapolation::DEFAULT_ROTATION_DAMPING;

    fn temp_config(tag: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("rfshared-config-{}-{tag}.yaml", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults_are_valid() {
        let config = RelayConfig::default();
        assert_eq!(config.region_name, "$rFactorShared$");
        assert_eq!(config.extrapolation.rotation_damping, DEFAULT_ROTATION_DAMPING);
        config.validate().unwrap();
    }

    #[test]
    fn partial_documents_fill_in_defaults() {
        let config = RelayConfig::from_yaml("extrapolation:\n  rotation_damping: 0.1\n").unwrap();
        assert_eq!(config.region_name, DEFAULT_REGION_NAME);
        assert_eq!(config.extrapolation.rotation_damping, 0.1);
        assert_eq!(config.extrapolation.max_elapsed_secs, 0.55);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = RelayConfig::from_yaml("region: foo\n").unwrap_err();
        assert!(matches!(err, RelayError::Config { .. }));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(RelayConfig::from_yaml("region_name: \"  \"\n").is_err());
        assert!(
            RelayConfig::from_yaml("extrapolation:\n  rotation_damping: -1.0\n").is_err()
        );
        assert!(
            RelayConfig::from_yaml("extrapolation:\n  max_elapsed_secs: 0.0\n").is_err()
        );
    }

    #[test]
    fn load_reads_files_with_context() {
        let path = temp_config("load", "region_name: \"$Test$\"\nlog_filter: debug\n");
        let config = RelayConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.region_name, "$Test$");
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn load_reports_the_failing_path() {
        let path = std::env::temp_dir().join("rfshared-config-does-not-exist.yaml");
        let err = RelayConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("rfshared-config-does-not-exist.yaml"));
    }

    #[test]
    fn missing_path_means_defaults() {
        assert_eq!(RelayConfig::load_optional(None).unwrap(), RelayConfig::default());
    }
}
