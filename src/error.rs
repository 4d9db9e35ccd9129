//! Errors raised by indexed properties.
//!
//! Every message starts with the canonical kind spelling from [`indexprop_core::errors`], followed by `: ` and a
//! human-readable description, e.g. `KeyNotFound: 'Kenny G' is not a key of appearances`.
//!
//! User callbacks are free to use their own error type `E`; the engine only requires `E: From<PropertyError>` so its
//! own failures can be returned through the same channel. Callback errors are never wrapped or rewritten.

use indexprop_core::{ErrorKind, Key};
use miette::Diagnostic;
use thiserror::Error;

/// Convenience alias for fallible property operations with the default error type.
pub type Result<T, E = PropertyError> = std::result::Result<T, E>;

/// A failure detected by the indexed-property engine itself.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum PropertyError {
    #[error("KeyNotFound: {key} is not a key of {property}")]
    #[diagnostic(code(indexprop::key_not_found))]
    KeyNotFound { property: String, key: Key },

    #[error("IndexOutOfRange: {property} index {index} is outside {start}:{stop}")]
    #[diagnostic(code(indexprop::index_out_of_range))]
    IndexOutOfRange {
        property: String,
        index: i64,
        start: i64,
        stop: i64,
    },

    #[error("UnsupportedOperation: {property} does not support `{operation}`")]
    #[diagnostic(
        code(indexprop::unsupported_operation),
        help("register the operation on the property before using it")
    )]
    Unsupported { property: String, operation: String },

    #[error("BroadcastLengthMismatch: {property} got {values} values for {keys} keys")]
    #[diagnostic(code(indexprop::broadcast_length_mismatch))]
    BroadcastLengthMismatch {
        property: String,
        keys: usize,
        values: usize,
    },

    #[error("InvalidKeyType: {property} cannot use {key} as a key ({reason})")]
    #[diagnostic(code(indexprop::invalid_key_type))]
    InvalidKeyType {
        property: String,
        key: Key,
        reason: String,
    },

    #[error("ConfigurationError: {property}: {message}")]
    #[diagnostic(code(indexprop::configuration))]
    Configuration { property: String, message: String },

    #[error("CapabilitySignature: `{capability}` of {property} takes {expected_args} and returns {expected_output}")]
    #[diagnostic(code(indexprop::capability_signature))]
    CapabilitySignature {
        property: String,
        capability: String,
        expected_args: &'static str,
        expected_output: &'static str,
    },
}

impl PropertyError {
    pub fn key_not_found(property: &str, key: Key) -> Self {
        Self::KeyNotFound {
            property: property.to_string(),
            key,
        }
    }

    pub fn index_out_of_range(property: &str, index: i64, start: i64, stop: i64) -> Self {
        Self::IndexOutOfRange {
            property: property.to_string(),
            index,
            start,
            stop,
        }
    }

    pub fn unsupported(property: &str, operation: impl Into<String>) -> Self {
        Self::Unsupported {
            property: property.to_string(),
            operation: operation.into(),
        }
    }

    pub fn broadcast_length_mismatch(property: &str, keys: usize, values: usize) -> Self {
        Self::BroadcastLengthMismatch {
            property: property.to_string(),
            keys,
            values,
        }
    }

    pub fn invalid_key_type(property: &str, key: Key, reason: impl Into<String>) -> Self {
        Self::InvalidKeyType {
            property: property.to_string(),
            key,
            reason: reason.into(),
        }
    }

    pub fn configuration(property: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            property: property.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn capability_signature(
        property: &str,
        capability: &str,
        expected_args: &'static str,
        expected_output: &'static str,
    ) -> Self {
        Self::CapabilitySignature {
            property: property.to_string(),
            capability: capability.to_string(),
            expected_args,
            expected_output,
        }
    }

    /// Return the registry kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::KeyNotFound { .. } => ErrorKind::KeyNotFound,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Self::Unsupported { .. } => ErrorKind::UnsupportedOperation,
            Self::BroadcastLengthMismatch { .. } => ErrorKind::BroadcastLengthMismatch,
            Self::InvalidKeyType { .. } => ErrorKind::InvalidKeyType,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::CapabilitySignature { .. } => ErrorKind::CapabilitySignature,
        }
    }

    /// Name of the property that raised the error.
    pub fn property(&self) -> &str {
        match self {
            Self::KeyNotFound { property, .. }
            | Self::IndexOutOfRange { property, .. }
            | Self::Unsupported { property, .. }
            | Self::BroadcastLengthMismatch { property, .. }
            | Self::InvalidKeyType { property, .. }
            | Self::Configuration { property, .. }
            | Self::CapabilitySignature { property, .. } => property,
        }
    }
}
