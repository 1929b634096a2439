//! Error types for knife-pendulum.
//!
//! The simulation core itself never fails once constructed: the knife
//! reaching either end of the arm is a boundary event, not an error.
//! Everything here concerns construction, configuration and I/O.

use thiserror::Error;

/// Result type alias for knife-pendulum operations.
pub type SimResult<T> = Result<T, SimError>;

/// Unified error type for all knife-pendulum operations.
#[derive(Debug, Error)]
pub enum SimError {
    // ===== Configuration Errors =====
    /// A component was constructed with parameters that make no physical sense.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Description of the violated precondition.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Schema validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ===== Reproducibility =====
    /// Repeated runs of the same configuration diverged.
    #[error("Non-reproducible run: digest {actual} differs from reference {expected}")]
    NonReproducible {
        /// Digest of the first run.
        expected: String,
        /// Digest of the diverging run.
        actual: String,
    },
}

impl SimError {
    /// Create an invalid-configuration error with a message.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create an I/O error with a message (wraps in `std::io::Error`).
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(std::io::Error::other(message.into()))
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_display() {
        let err = SimError::invalid_config("start position 5 exceeds arm length 4");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: start position 5 exceeds arm length 4"
        );
        assert!(matches!(err, SimError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_io_error() {
        let err = SimError::io("disk full");
        assert!(err.to_string().contains("disk full"));
        assert!(matches!(err, SimError::Io(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<u32>("not: [a number").unwrap_err();
        let err: SimError = yaml_err.into();
        assert!(matches!(err, SimError::YamlParse(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("{").unwrap_err();
        let err: SimError = json_err.into();
        assert!(matches!(err, SimError::Serialization(_)));
    }

    #[test]
    fn test_non_reproducible_display() {
        let err = SimError::NonReproducible {
            expected: "aa".to_string(),
            actual: "bb".to_string(),
        };
        assert!(err.to_string().contains("bb differs from reference aa"));
    }
}
