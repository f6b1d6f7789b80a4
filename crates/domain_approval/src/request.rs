//! Maker-checker approval requests
//!
//! One state graph serves every payload type:
//! Pending -> Validated -> Approved or Rejected, and Approved -> Treated for
//! payloads that settle in cash. Each transition records who acted and when.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ApprovalRequestId, BranchId, TransactionReference, UserId};

use crate::error::ApprovalError;
use crate::payload::ApprovalPayload;

/// Status of an approval request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Validated,
    Approved,
    Rejected,
    Treated,
}

impl ApprovalStatus {
    /// Returns true if no further transitions are accepted
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApprovalStatus::Rejected | ApprovalStatus::Treated)
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Validated => "validated",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
            ApprovalStatus::Treated => "treated",
        };
        write!(f, "{label}")
    }
}

/// The four transitions of the graph
///
/// Each action names its exact required source status and its target, so the
/// graph is encoded in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    Validate,
    Approve,
    Reject,
    Treat,
}

impl ApprovalAction {
    /// Status a request must be in for this action to apply
    pub fn required_source(&self) -> ApprovalStatus {
        match self {
            ApprovalAction::Validate => ApprovalStatus::Pending,
            ApprovalAction::Approve | ApprovalAction::Reject => ApprovalStatus::Validated,
            ApprovalAction::Treat => ApprovalStatus::Approved,
        }
    }

    /// Status the action moves the request into
    pub fn target(&self) -> ApprovalStatus {
        match self {
            ApprovalAction::Validate => ApprovalStatus::Validated,
            ApprovalAction::Approve => ApprovalStatus::Approved,
            ApprovalAction::Reject => ApprovalStatus::Rejected,
            ApprovalAction::Treat => ApprovalStatus::Treated,
        }
    }

    /// Returns true if the actor must differ from the request initiator.
    /// Rejecting your own request is allowed; pushing it forward is not.
    pub fn needs_distinct_actor(&self) -> bool {
        !matches!(self, ApprovalAction::Reject)
    }
}

impl fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApprovalAction::Validate => "validate",
            ApprovalAction::Approve => "approve",
            ApprovalAction::Reject => "reject",
            ApprovalAction::Treat => "treat",
        };
        write!(f, "{label}")
    }
}

/// An approval request with its full audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Unique request identifier
    pub id: ApprovalRequestId,
    /// Branch the request was raised in
    pub branch_id: BranchId,
    /// Business content of the request
    pub payload: ApprovalPayload,
    /// Current status
    pub status: ApprovalStatus,
    /// Maker who raised the request
    pub initiator: UserId,
    /// When the request was raised
    pub initiated_at: DateTime<Utc>,
    /// Maker's note on the request
    pub narration: Option<String>,
    /// Who validated, when, and with what comment
    pub validated_by: Option<UserId>,
    pub validated_at: Option<DateTime<Utc>>,
    pub validation_comment: Option<String>,
    /// Who approved, when, and with what comment
    pub approved_by: Option<UserId>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approval_comment: Option<String>,
    /// Who rejected, when, and with what comment
    pub rejected_by: Option<UserId>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_comment: Option<String>,
    /// Who treated, when, and with what comment
    pub treated_by: Option<UserId>,
    pub treated_at: Option<DateTime<Utc>>,
    pub treatment_comment: Option<String>,
    /// Reference of the settlement posting, once it has run
    pub posted_reference: Option<TransactionReference>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl ApprovalRequest {
    /// Raises a new request in Pending
    pub fn submit(
        branch_id: BranchId,
        payload: ApprovalPayload,
        initiator: UserId,
        narration: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ApprovalRequestId::new(),
            branch_id,
            payload,
            status: ApprovalStatus::Pending,
            initiator,
            initiated_at: now,
            narration,
            validated_by: None,
            validated_at: None,
            validation_comment: None,
            approved_by: None,
            approved_at: None,
            approval_comment: None,
            rejected_by: None,
            rejected_at: None,
            rejection_comment: None,
            treated_by: None,
            treated_at: None,
            treatment_comment: None,
            posted_reference: None,
            updated_at: now,
        }
    }

    /// Applies one transition, enforcing the graph guards.
    ///
    /// The action must match the request's exact current status, and the
    /// actor must not be the initiator except on reject. On success the
    /// matching audit fields are stamped.
    pub fn apply(
        &mut self,
        action: ApprovalAction,
        actor: UserId,
        comment: Option<String>,
    ) -> Result<(), ApprovalError> {
        if self.status != action.required_source() {
            return Err(ApprovalError::InvalidTransition {
                from: self.status,
                action,
            });
        }
        if action.needs_distinct_actor() && actor == self.initiator {
            return Err(ApprovalError::SelfAction { action });
        }
        let now = Utc::now();
        match action {
            ApprovalAction::Validate => {
                self.validated_by = Some(actor);
                self.validated_at = Some(now);
                self.validation_comment = comment;
            }
            ApprovalAction::Approve => {
                self.approved_by = Some(actor);
                self.approved_at = Some(now);
                self.approval_comment = comment;
            }
            ApprovalAction::Reject => {
                self.rejected_by = Some(actor);
                self.rejected_at = Some(now);
                self.rejection_comment = comment;
            }
            ApprovalAction::Treat => {
                self.treated_by = Some(actor);
                self.treated_at = Some(now);
                self.treatment_comment = comment;
            }
        }
        self.status = action.target();
        self.updated_at = now;
        Ok(())
    }

    pub fn validate(&mut self, actor: UserId, comment: Option<String>) -> Result<(), ApprovalError> {
        self.apply(ApprovalAction::Validate, actor, comment)
    }

    pub fn approve(&mut self, actor: UserId, comment: Option<String>) -> Result<(), ApprovalError> {
        self.apply(ApprovalAction::Approve, actor, comment)
    }

    pub fn reject(&mut self, actor: UserId, comment: Option<String>) -> Result<(), ApprovalError> {
        self.apply(ApprovalAction::Reject, actor, comment)
    }

    pub fn treat(&mut self, actor: UserId, comment: Option<String>) -> Result<(), ApprovalError> {
        self.apply(ApprovalAction::Treat, actor, comment)
    }

    /// Records the settlement posting reference exactly once
    pub fn mark_posted(&mut self, reference: TransactionReference) -> Result<(), ApprovalError> {
        if let Some(existing) = &self.posted_reference {
            return Err(ApprovalError::AlreadyPosted {
                reference: existing.to_string(),
            });
        }
        self.posted_reference = Some(reference);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Returns true if the settlement posting has already run
    pub fn is_posted(&self) -> bool {
        self.posted_reference.is_some()
    }
}
