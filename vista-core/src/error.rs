//! Error types for VISTA operations

use thiserror::Error;

/// Request validation errors.
///
/// A request that fails validation is dropped without a response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },
}

/// Search index errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("Search request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Search response mismatch: expected {expected} responses, got {got}")]
    ResponseMismatch { expected: usize, got: usize },

    #[error("Search failed for sub-query {position}: {reason}")]
    ShardFailure { position: usize, reason: String },

    #[error("Failed to decode search response: {reason}")]
    Decode { reason: String },
}

/// Permission store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PermissionError {
    #[error("Lookup failed at {path}: {reason}")]
    LookupFailed { path: String, reason: String },

    #[error("Failed to decode value at {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// Request/response transport errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request source failed: {reason}")]
    SourceFailed { reason: String },

    #[error("Publishing response {key} failed: {reason}")]
    PublishFailed { key: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all VISTA errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VistaError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Permission error: {0}")]
    Permission(#[from] PermissionError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for VISTA operations.
pub type VistaResult<T> = Result<T, VistaError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::RequiredFieldMissing {
            field: "userId".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Required field missing"));
        assert!(msg.contains("userId"));
    }

    #[test]
    fn test_index_error_display_mismatch() {
        let err = IndexError::ResponseMismatch {
            expected: 3,
            got: 2,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("expected 3"));
        assert!(msg.contains("got 2"));
    }

    #[test]
    fn test_permission_error_display_lookup_failed() {
        let err = PermissionError::LookupFailed {
            path: "inner-circle/a/b".to_string(),
            reason: "connection reset".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("inner-circle/a/b"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_vista_error_from_variants() {
        let validation = VistaError::from(ValidationError::RequiredFieldMissing {
            field: "query".to_string(),
        });
        assert!(matches!(validation, VistaError::Validation(_)));

        let index = VistaError::from(IndexError::RequestFailed {
            reason: "timeout".to_string(),
        });
        assert!(matches!(index, VistaError::Index(_)));

        let permission = VistaError::from(PermissionError::LookupFailed {
            path: "privacy-look-me/a".to_string(),
            reason: "denied".to_string(),
        });
        assert!(matches!(permission, VistaError::Permission(_)));

        let transport = VistaError::from(TransportError::SourceFailed {
            reason: "closed".to_string(),
        });
        assert!(matches!(transport, VistaError::Transport(_)));

        let config = VistaError::from(ConfigError::InvalidValue {
            field: "page_size".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        });
        assert!(matches!(config, VistaError::Config(_)));
    }
}
