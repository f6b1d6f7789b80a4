//! Approval workflow errors

use thiserror::Error;

use core_kernel::{ErrorKind, OperationError};

use crate::request::{ApprovalAction, ApprovalStatus};

/// Errors raised by the approval state machine
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// The action does not apply to the request's current status
    #[error("Cannot {action} a request in status {from}: already processed")]
    InvalidTransition {
        from: ApprovalStatus,
        action: ApprovalAction,
    },

    /// The initiator tried to act on their own request
    #[error("Initiator cannot {action} their own request")]
    SelfAction { action: ApprovalAction },

    /// A ledger posting was already recorded for this request
    #[error("Request already posted under reference {reference}")]
    AlreadyPosted { reference: String },
}

impl From<ApprovalError> for OperationError {
    fn from(err: ApprovalError) -> Self {
        let kind = match &err {
            ApprovalError::InvalidTransition { .. } | ApprovalError::AlreadyPosted { .. } => {
                ErrorKind::Conflict
            }
            ApprovalError::SelfAction { .. } => ErrorKind::Forbidden,
        };
        OperationError::new(kind, err.to_string())
    }
}
