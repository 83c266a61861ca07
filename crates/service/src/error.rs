//! Error type shared by every service in this crate.

use regdesk_core::{CoreError, ValidationErrors};
use regdesk_geo::GeoError;
use regdesk_storage::StorageError;
use thiserror::Error;

/// Service-layer error unifying storage, validation and lookup failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed (DB, pool, uninitialized store).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Form input broke one or more field rules.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Entity referenced by id does not exist.
    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// Caller provided invalid input (unknown field, malformed data).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization failed in the service layer.
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading a photo file failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Country lookup failed.
    #[error("geo: {0}")]
    Geo(#[from] GeoError),
}

impl ServiceError {
    /// Busy storage or a flaky lookup; the same call may succeed later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::Geo(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Missing candidate, or a missing row reported by storage.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Storage(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Per-field errors when this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Serialization(e) => Self::Serialization(e),
            CoreError::InvalidInput(msg) => Self::InvalidInput(msg),
        }
    }
}
