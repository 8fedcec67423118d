//! Validation settings.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use sonr_key::JwsAlgorithm;
use typed_builder::TypedBuilder;

use crate::{
    default::{
        default_algorithms, default_clock_drift_tolerance, default_max_proof_depth, default_true,
    },
    time, UcanError, UcanResult,
};

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// The main configuration trait.
pub trait MainConfig {
    /// Validates the configuration.
    fn validate(&self) -> UcanResult<()>;

    /// Loads the configuration from a toml file.
    fn from_file(path: impl AsRef<Path>) -> UcanResult<Self>
    where
        Self: Sized + for<'de> serde::Deserialize<'de>,
    {
        let config = fs::read_to_string(path)?;
        Self::from_string(config)
    }

    /// Loads the configuration from a toml string.
    fn from_string(config: impl AsRef<str>) -> UcanResult<Self>
    where
        Self: Sized + for<'de> serde::Deserialize<'de>,
    {
        let config: Self = toml::from_str(config.as_ref())?;
        config.validate()?;
        Ok(config)
    }
}

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Settings for [`validate_token`](crate::validate_token).
///
/// Every field has a default, so an empty toml document is a valid configuration:
///
/// ```toml
/// clock_drift_tolerance = 30
/// validate_proof_chain = true
/// algorithms = ["EdDSA", "ES256"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct ValidationOptions {
    /// The current time in Unix seconds. Uses the system clock when unset.
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub now: Option<i64>,

    /// Seconds of slack allowed on both sides of the validity window.
    #[serde(default = "default_clock_drift_tolerance")]
    #[builder(default = default_clock_drift_tolerance())]
    pub clock_drift_tolerance: u64,

    /// Whether to check the signature.
    #[serde(default = "default_true")]
    #[builder(default = true)]
    pub verify_signature: bool,

    /// Whether to validate every proof in `prf` and the delegation between them.
    #[serde(default)]
    #[builder(default)]
    pub validate_proof_chain: bool,

    /// How many proofs deep a delegation chain may go.
    #[serde(default = "default_max_proof_depth")]
    #[builder(default = default_max_proof_depth())]
    pub max_proof_depth: usize,

    /// Whether delegated capabilities must also narrow their proofs' caveats.
    #[serde(default)]
    #[builder(default)]
    pub check_caveats: bool,

    /// The header algorithms accepted.
    #[serde(default = "default_algorithms")]
    #[builder(default = default_algorithms())]
    pub algorithms: Vec<JwsAlgorithm>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ValidationOptions {
    /// Returns the configured time or the system clock.
    pub fn current_time(&self) -> i64 {
        self.now.unwrap_or_else(time::now)
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl MainConfig for ValidationOptions {
    fn validate(&self) -> UcanResult<()> {
        if self.algorithms.is_empty() {
            return Err(UcanError::InvalidArgument(
                "at least one algorithm must be accepted".to_string(),
            ));
        }

        if self.max_proof_depth == 0 {
            return Err(UcanError::InvalidArgument(
                "max_proof_depth must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_validation_options_defaults() -> anyhow::Result<()> {
        let options = ValidationOptions::from_string("")?;
        tracing::debug!(?options);

        assert_eq!(options, ValidationOptions::default());
        assert_eq!(options.now, None);
        assert_eq!(options.clock_drift_tolerance, 60);
        assert!(options.verify_signature);
        assert!(!options.validate_proof_chain);
        assert_eq!(options.max_proof_depth, 16);
        assert!(!options.check_caveats);
        assert_eq!(options.algorithms, JwsAlgorithm::ALL);

        Ok(())
    }

    #[test_log::test]
    fn test_validation_options_from_toml() -> anyhow::Result<()> {
        let options = ValidationOptions::from_string(
            r#"
            now = 1700000000
            clock_drift_tolerance = 5
            verify_signature = false
            validate_proof_chain = true
            algorithms = ["EdDSA"]
            "#,
        )?;

        assert_eq!(options.current_time(), 1700000000);
        assert_eq!(options.clock_drift_tolerance, 5);
        assert!(!options.verify_signature);
        assert!(options.validate_proof_chain);
        assert_eq!(options.algorithms, [JwsAlgorithm::EdDSA]);

        Ok(())
    }

    #[test_log::test]
    fn test_validation_options_rejects_bad_values() {
        assert!(matches!(
            ValidationOptions::from_string("algorithms = []"),
            Err(UcanError::InvalidArgument(_))
        ));
        assert!(matches!(
            ValidationOptions::from_string("max_proof_depth = 0"),
            Err(UcanError::InvalidArgument(_))
        ));
        assert!(matches!(
            ValidationOptions::from_string("algorithms = [\"HS256\"]"),
            Err(UcanError::TomlError(_))
        ));
    }

    #[test_log::test]
    fn test_validation_options_builder() {
        let options = ValidationOptions::builder()
            .now(42)
            .verify_signature(false)
            .build();

        assert_eq!(options.current_time(), 42);
        assert!(!options.verify_signature);
        assert_eq!(options.clock_drift_tolerance, 60);
    }
}
