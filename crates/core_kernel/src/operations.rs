//! Shared posting vocabulary
//!
//! Operation types, posting directions and leg roles are used by the ledger
//! (rows), the teller registry (rights) and the approval workflow (payloads),
//! so they live in the kernel alongside the other common value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Business operation types flowing through the posting pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// Cash deposit onto a member account
    CashDeposit,
    /// Cash withdrawal from a member account
    CashWithdrawal,
    /// Book-entry debit of a member account (no cash moves)
    NoneCashDebit,
    /// Book-entry credit of a member account (no cash moves)
    NoneCashCredit,
    /// Open-of-day till provisioning
    TillOpening,
    /// Intra-day till top-up from the primary till
    TillReplenishment,
    /// Compensating mirror of a previously posted operation
    Reversal,
    /// Cash received to fund a remittance
    RemittanceFunding,
    /// Cash paid out for a funded remittance
    RemittancePayout,
}

impl OperationType {
    /// Returns the reference-code prefix for this operation
    pub fn reference_prefix(&self) -> &'static str {
        match self {
            OperationType::CashDeposit => "CD",
            OperationType::CashWithdrawal => "CW",
            OperationType::NoneCashDebit => "ND",
            OperationType::NoneCashCredit => "NC",
            OperationType::TillOpening => "TO",
            OperationType::TillReplenishment => "TR",
            OperationType::Reversal => "RV",
            OperationType::RemittanceFunding => "RF",
            OperationType::RemittancePayout => "RP",
        }
    }

    /// Returns the rights category this operation falls under
    pub fn category(&self) -> OperationCategory {
        match self {
            OperationType::CashDeposit | OperationType::CashWithdrawal => OperationCategory::Cash,
            OperationType::NoneCashDebit | OperationType::NoneCashCredit => {
                OperationCategory::NoneCash
            }
            OperationType::TillOpening | OperationType::TillReplenishment => {
                OperationCategory::TillManagement
            }
            OperationType::Reversal => OperationCategory::Reversal,
            OperationType::RemittanceFunding | OperationType::RemittancePayout => {
                OperationCategory::Remittance
            }
        }
    }

    /// Returns true if the operation moves physical cash through a drawer
    ///
    /// Reversals are resolved at posting time from the legs of the original
    /// operation, so they answer false here.
    pub fn moves_drawer_cash(&self) -> bool {
        matches!(
            self,
            OperationType::CashDeposit
                | OperationType::CashWithdrawal
                | OperationType::TillOpening
                | OperationType::TillReplenishment
                | OperationType::RemittanceFunding
                | OperationType::RemittancePayout
        )
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OperationType::CashDeposit => "cash_deposit",
            OperationType::CashWithdrawal => "cash_withdrawal",
            OperationType::NoneCashDebit => "none_cash_debit",
            OperationType::NoneCashCredit => "none_cash_credit",
            OperationType::TillOpening => "till_opening",
            OperationType::TillReplenishment => "till_replenishment",
            OperationType::Reversal => "reversal",
            OperationType::RemittanceFunding => "remittance_funding",
            OperationType::RemittancePayout => "remittance_payout",
        };
        write!(f, "{label}")
    }
}

/// Rights categories a teller can be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationCategory {
    Cash,
    NoneCash,
    TillManagement,
    Reversal,
    Remittance,
}

/// Direction of a posting leg, from the account holder's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingDirection {
    /// Balance decreases
    Debit,
    /// Balance increases
    Credit,
}

impl PostingDirection {
    /// Returns the opposite direction
    pub fn opposite(&self) -> Self {
        match self {
            PostingDirection::Debit => PostingDirection::Credit,
            PostingDirection::Credit => PostingDirection::Debit,
        }
    }
}

/// Role a leg plays within an orchestrated operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegRole {
    /// The business amount moving between claim accounts
    Principal,
    /// Physical cash entering or leaving a drawer
    Custody,
    /// Fee charged on the operation
    Fee,
    /// VAT charged on the fee
    Vat,
}
