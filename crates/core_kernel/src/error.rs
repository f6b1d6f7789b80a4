//! Core error types used across the system
//!
//! Every failure crossing the service boundary is an [`OperationError`]:
//! a classification kind plus a human-readable message. Domain crates keep
//! their own precise error enums and convert at the boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::money::MoneyError;

/// Classification of a service-boundary failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input or a business-rule breach
    Validation,
    /// The referenced entity does not exist
    NotFound,
    /// A state precondition failed (duplicate open, stale version, already processed)
    Conflict,
    /// The caller may not perform the operation
    Forbidden,
    /// Unexpected failure; correlation id logged, no partial state
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

/// Structured failure returned by every service operation
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct OperationError {
    kind: ErrorKind,
    message: String,
}

impl OperationError {
    /// Creates an error with an explicit kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns the failure classification
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<MoneyError> for OperationError {
    fn from(err: MoneyError) -> Self {
        OperationError::validation(err.to_string())
    }
}
