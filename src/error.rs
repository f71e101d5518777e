//! Error types for the shared memory relay.
//!
//! Errors never reach the host simulator. The plugin surface logs them and
//! degrades instead: any failure to acquire the shared region leaves the relay
//! permanently disabled for the lifetime of the process.
//!
//! ## Error Categories
//!
//! - **Mapping Errors**: creating, opening or mapping the named region
//! - **Layout Errors**: a mapped view or byte buffer with the wrong frame size
//! - **Config Errors**: invalid relay configuration
//! - **Reader Errors**: failures on the consumer side of the region
//! - **Windows API Errors**: platform-specific Windows operation failures
//!
//! ```rust
//! use rfshared::RelayError;
//!
//! let error = RelayError::region_open_failed("$rFactorShared$", None);
//! assert!(error.disables_publishing());
//! assert!(!error.is_retryable());
//! ```

use thiserror::Error;

#[cfg(windows)]
use windows_core as core;

/// Result type alias for relay operations.
pub type Result<T, E = RelayError> = std::result::Result<T, E>;

/// Boxed error carried as the source of a mapping failure.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for relay operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RelayError {
    #[error("Failed to create shared region '{name}'")]
    RegionCreateFailed {
        name: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Failed to open existing shared region '{name}'")]
    RegionOpenFailed {
        name: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Failed to map {size} bytes of shared region '{name}'")]
    ViewMapFailed {
        name: String,
        size: usize,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Frame layout mismatch: expected {expected} bytes, found {found}")]
    Layout { expected: usize, found: usize },

    #[error("Invalid relay configuration: {details}")]
    Config { details: String },

    #[error("Reader error: {context}")]
    Reader { context: String },

    #[error("{feature} is only available on {required_platform}")]
    UnsupportedPlatform { feature: String, required_platform: String },

    #[error("Windows API error: {operation}")]
    #[cfg(windows)]
    WindowsApi {
        operation: String,
        #[source]
        source: core::Error,
    },
}

impl RelayError {
    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// Mapping failures are permanent for the process: the relay never retries them.
    pub fn is_retryable(&self) -> bool {
        match self {
            RelayError::RegionCreateFailed { .. } => false,
            RelayError::RegionOpenFailed { .. } => false,
            RelayError::ViewMapFailed { .. } => false,
            RelayError::Layout { .. } => false,
            RelayError::Config { .. } => false,
            RelayError::Reader { .. } => true,
            RelayError::UnsupportedPlatform { .. } => false,
            #[cfg(windows)]
            RelayError::WindowsApi { .. } => true,
        }
    }

    /// Returns whether this error puts the publisher into the disabled state.
    pub fn disables_publishing(&self) -> bool {
        matches!(
            self,
            RelayError::RegionCreateFailed { .. }
                | RelayError::RegionOpenFailed { .. }
                | RelayError::ViewMapFailed { .. }
                | RelayError::Layout { .. }
        )
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            RelayError::RegionCreateFailed { .. } => vec![
                "Check that no other process owns the region with incompatible access",
                "Check Windows permissions for named shared memory",
                "Restart the simulator to retry the mapping",
            ],
            RelayError::RegionOpenFailed { .. } => vec![
                "Close stale readers holding an incompatible region open",
                "Restart the simulator to retry the mapping",
            ],
            RelayError::ViewMapFailed { .. } => vec![
                "Check available virtual address space",
                "Verify the region size matches the frame layout",
                "Restart the simulator to retry the mapping",
            ],
            RelayError::Layout { .. } => vec![
                "Rebuild reader and writer against the same frame layout",
                "Check that the region was not created by an older plugin version",
            ],
            RelayError::Config { .. } => vec![
                "Check the YAML syntax of the relay configuration",
                "Remove unknown keys from the configuration",
                "Use non-negative damping factors and a positive extrapolation window",
            ],
            RelayError::Reader { .. } => vec![
                "Check that the simulator is running with the plugin loaded",
                "Retry the read; torn frames settle on the next update",
            ],
            RelayError::UnsupportedPlatform { .. } => vec![
                "Use the process-local heap backend for testing",
                "Check documentation for platform requirements",
            ],
            #[cfg(windows)]
            RelayError::WindowsApi { .. } => vec![
                "Check Windows API permissions",
                "Verify system resources availability",
            ],
        }
    }

    /// Helper constructor for region creation failures.
    pub fn region_create_failed(name: impl Into<String>, source: Option<BoxedSource>) -> Self {
        RelayError::RegionCreateFailed { name: name.into(), source }
    }

    /// Helper constructor for failures of the open fallback.
    pub fn region_open_failed(name: impl Into<String>, source: Option<BoxedSource>) -> Self {
        RelayError::RegionOpenFailed { name: name.into(), source }
    }

    /// Helper constructor for view mapping failures.
    pub fn view_map_failed(
        name: impl Into<String>,
        size: usize,
        source: Option<BoxedSource>,
    ) -> Self {
        RelayError::ViewMapFailed { name: name.into(), size, source }
    }

    /// Helper constructor for configuration errors.
    pub fn config(details: impl Into<String>) -> Self {
        RelayError::Config { details: details.into() }
    }

    /// Helper constructor for reader errors.
    pub fn reader(context: impl Into<String>) -> Self {
        RelayError::Reader { context: context.into() }
    }

    /// Helper constructor for Windows API errors.
    #[cfg(windows)]
    pub fn windows_api_error(operation: impl Into<String>, source: core::Error) -> Self {
        RelayError::WindowsApi { operation: operation.into(), source }
    }

    /// Helper constructor for unsupported platform errors.
    pub fn unsupported_platform(
        feature: impl Into<String>,
        required_platform: impl Into<String>,
    ) -> Self {
        RelayError::UnsupportedPlatform {
            feature: feature.into(),
            required_platform: required_platform.into(),
        }
    }
}

impl From<serde_yaml_ng::Error> for RelayError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        RelayError::Config { details: err.to_string() }
    }
}

#[cfg(windows)]
impl From<core::Error> for RelayError {
    fn from(err: core::Error) -> Self {
        RelayError::WindowsApi { operation: "Unknown Windows operation".to_string(), source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
          #[test]
          fn mapping_errors_carry_region_name(
            name in "[$A-Za-z0-9_]{1,32}",
            size in 1usize..100_000usize
          ) {
            let create = RelayError::region_create_failed(name.clone(), None);
            let open = RelayError::region_open_failed(name.clone(), None);
            let map = RelayError::view_map_failed(name.clone(), size, None);

            prop_assert!(create.to_string().contains(&name));
            prop_assert!(open.to_string().contains(&name));
            prop_assert!(map.to_string().contains(&name));
            prop_assert!(map.to_string().contains(&size.to_string()));

            for error in [&create, &open, &map] {
              prop_assert!(error.disables_publishing());
              prop_assert!(!error.is_retryable());
            }
          }

          #[test]
          fn source_chain_is_preserved(base_message in ".*") {
            let source: BoxedSource = Box::new(std::io::Error::other(base_message.clone()));
            let error = RelayError::region_open_failed("region", Some(source));

            let chained = std::error::Error::source(&error).map(|s| s.to_string());
            prop_assert_eq!(chained, Some(base_message));
          }

          #[test]
          fn layout_errors_report_both_sizes(expected in 0usize..1_000_000, found in 0usize..1_000_000) {
            let error = RelayError::Layout { expected, found };
            let message = error.to_string();
            prop_assert!(message.contains(&expected.to_string()));
            prop_assert!(message.contains(&found.to_string()));
          }
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<RelayError>();

        let error = RelayError::config("test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn recovery_suggestions_are_descriptive() {
        let errors = [
            RelayError::region_create_failed("r", None),
            RelayError::region_open_failed("r", None),
            RelayError::view_map_failed("r", 16, None),
            RelayError::config("bad"),
            RelayError::reader("torn"),
            RelayError::unsupported_platform("Named regions", "Windows"),
        ];

        for error in &errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            assert!(suggestions.iter().all(|s| s.len() > 5));
        }
    }

    #[test]
    fn reader_and_config_errors_do_not_disable_publishing() {
        assert!(!RelayError::reader("torn").disables_publishing());
        assert!(RelayError::reader("torn").is_retryable());
        assert!(!RelayError::config("bad").disables_publishing());
    }

    #[test]
    fn yaml_errors_convert_to_config() {
        let err = serde_yaml_ng::from_str::<u32>("[not, a, number]").unwrap_err();
        let relay: RelayError = err.into();
        assert!(matches!(relay, RelayError::Config { .. }));
    }
}
