//! Store error types

use thiserror::Error;

use core_kernel::{ErrorKind, OperationError};

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found in the store
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// An insert collided with an existing row
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// An update carried a stale version token
    #[error("Version conflict on {entity}: expected {expected}, found {actual}")]
    VersionConflict {
        entity: String,
        expected: u64,
        actual: u64,
    },

    /// A reference reservation is not in the state the caller assumed
    #[error("Reference {reference} is {state}, not reserved")]
    ReferenceState { reference: String, state: String },

    /// A lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Creates a not found error for a specific entity type and identifier
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        StoreError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    /// Returns true if the caller may safely re-read and retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. })
    }
}

impl From<StoreError> for OperationError {
    fn from(err: StoreError) -> Self {
        let kind = match &err {
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::DuplicateEntry(_)
            | StoreError::VersionConflict { .. }
            | StoreError::ReferenceState { .. } => ErrorKind::Conflict,
            StoreError::LockPoisoned => ErrorKind::Internal,
        };
        OperationError::new(kind, err.to_string())
    }
}
