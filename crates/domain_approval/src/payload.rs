//! Approval request payloads
//!
//! The workflow enforces one state graph for every request; the payload
//! carries the business content and decides where in the graph the ledger
//! posting happens. Reversals and remittance payouts hand out physical cash,
//! so they settle at treat, against an open till. None-cash operations are
//! book entries and settle as soon as the checker approves.

use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, Money, OperationType, PostingDirection, TransactionReference};

/// Point in the approval graph where the ledger posting runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    /// Post when the checker approves
    OnApprove,
    /// Post at the treat step, which needs an open till
    OnTreat,
}

impl Settlement {
    pub fn requires_treat(&self) -> bool {
        matches!(self, Settlement::OnTreat)
    }
}

/// Business content of an approval request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApprovalPayload {
    /// Reverse a previously posted operation by mirroring its legs
    Reversal {
        /// Reference of the operation being reversed
        original_reference: TransactionReference,
        /// Why the reversal was requested
        reason: String,
    },
    /// Book-entry debit or credit of a member account
    NoneCash {
        /// Account to post against
        account_id: AccountId,
        /// Debit or credit, from the holder's perspective
        direction: PostingDirection,
        /// Amount to post
        amount: Money,
        /// Free-text description for the ledger row
        narration: Option<String>,
    },
    /// Pay out a funded remittance in cash
    RemittancePayout {
        /// Reference of the funding operation
        funding_reference: TransactionReference,
        /// Who collects the cash
        beneficiary: String,
        /// Amount to pay out
        amount: Money,
    },
}

impl ApprovalPayload {
    /// Where in the graph this payload settles
    pub fn settlement(&self) -> Settlement {
        match self {
            ApprovalPayload::Reversal { .. } | ApprovalPayload::RemittancePayout { .. } => {
                Settlement::OnTreat
            }
            ApprovalPayload::NoneCash { .. } => Settlement::OnApprove,
        }
    }

    /// Operation type the settlement posting will carry
    pub fn operation_type(&self) -> OperationType {
        match self {
            ApprovalPayload::Reversal { .. } => OperationType::Reversal,
            ApprovalPayload::NoneCash { direction, .. } => match direction {
                PostingDirection::Debit => OperationType::NoneCashDebit,
                PostingDirection::Credit => OperationType::NoneCashCredit,
            },
            ApprovalPayload::RemittancePayout { .. } => OperationType::RemittancePayout,
        }
    }

    /// Short label used in log fields and audit messages
    pub fn label(&self) -> &'static str {
        match self {
            ApprovalPayload::Reversal { .. } => "reversal",
            ApprovalPayload::NoneCash { .. } => "none_cash",
            ApprovalPayload::RemittancePayout { .. } => "remittance_payout",
        }
    }
}
