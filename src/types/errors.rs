//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation. Startup
//! errors (decode, validation, registration, source resolution) stop toolbox
//! construction; parameter, credential and vendor errors are per-call and are
//! returned to the caller as the invocation result.

use crate::looker::LookerError;
use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the toolbox.
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration document could not be parsed into the expected shape.
    #[error("config decode error: {0}")]
    ConfigDecode(String),

    /// A required configuration field is absent or invalid.
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    /// No factory registered for a declared kind.
    #[error("unknown kind: {0}")]
    UnknownKind(String),

    /// A second factory was registered under an existing kind (startup-fatal).
    #[error("kind {0:?} already registered")]
    DuplicateKind(String),

    /// Invocation names a tool the toolbox does not hold.
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Tool references a source name that is not configured.
    #[error("no source named {0:?} configured")]
    UnknownSource(String),

    /// Source exists but lacks the capability set the tool requires.
    #[error("invalid source for {tool_kind:?} tool: source {source_name:?} does not provide {capability}")]
    IncompatibleSource {
        source_name: String,
        tool_kind: String,
        capability: &'static str,
    },

    /// Missing required parameter or type mismatch.
    #[error("invalid parameter {name:?}: {reason}")]
    ParameterValidation { name: String, reason: String },

    /// Caller credentials required but not supplied (or unusable).
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// Vendor call failed. The operation is named, the cause is preserved.
    #[error("{operation}: {cause}")]
    VendorCall {
        operation: String,
        #[source]
        cause: Box<LookerError>,
    },

    /// Caller cancelled the invocation before the vendor call returned.
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience constructors
impl Error {
    pub fn config_decode(msg: impl Into<String>) -> Self {
        Self::ConfigDecode(msg.into())
    }

    pub fn config_validation(msg: impl Into<String>) -> Self {
        Self::ConfigValidation(msg.into())
    }

    pub fn parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParameterValidation {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_credential(msg: impl Into<String>) -> Self {
        Self::MissingCredential(msg.into())
    }

    pub fn vendor(operation: impl Into<String>, cause: LookerError) -> Self {
        Self::VendorCall {
            operation: operation.into(),
            cause: Box::new(cause),
        }
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// True for errors that must stop startup rather than fail a single call.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigDecode(_)
                | Error::ConfigValidation(_)
                | Error::UnknownKind(_)
                | Error::DuplicateKind(_)
                | Error::UnknownSource(_)
                | Error::IncompatibleSource { .. }
        )
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::ConfigDecode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_vendor_error_keeps_cause() {
        let err = Error::vendor(
            "failed to create model set",
            LookerError::Api {
                status: 422,
                body: "name already taken".to_string(),
            },
        );

        let msg = err.to_string();
        assert!(msg.starts_with("failed to create model set: "));
        assert!(msg.contains("name already taken"));

        let cause = err.source().expect("cause is chained");
        assert!(cause.to_string().contains("422"));
    }

    #[test]
    fn test_parameter_error_names_parameter() {
        let err = Error::parameter("limit", "expected integer, got string");
        assert_eq!(
            err.to_string(),
            "invalid parameter \"limit\": expected integer, got string"
        );
    }

    #[test]
    fn test_startup_fatal_classification() {
        assert!(Error::DuplicateKind("x".into()).is_startup_fatal());
        assert!(Error::UnknownSource("s".into()).is_startup_fatal());
        assert!(!Error::missing_credential("no token").is_startup_fatal());
        assert!(!Error::parameter("name", "missing").is_startup_fatal());
    }
}
