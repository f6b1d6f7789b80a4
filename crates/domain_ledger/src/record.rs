//! Immutable posting rows
//!
//! One [`TransactionRecord`] per leg, plus a [`TellerOperationRecord`]
//! mirroring the movement from the till's perspective whenever a drawer is
//! touched. Rows are written once and never modified; reversals post fresh
//! compensating rows that point back through `related_reference`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{
    AccountId, BranchId, LegRole, Money, OperationType, PostingDirection, TellerId,
    TellerOperationId, TransactionId, TransactionReference,
};

/// A single posted leg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique identifier
    pub id: TransactionId,
    /// Reference code of the orchestrated operation
    pub reference: TransactionReference,
    /// Account the leg was applied to
    pub account_id: AccountId,
    /// Branch the operation posted in
    pub branch_id: BranchId,
    /// Direction of the mutation
    pub direction: PostingDirection,
    /// Magnitude of the mutation (non-negative)
    pub amount: Money,
    /// Account balance before the mutation
    pub previous_balance: Money,
    /// Account balance after the mutation
    pub new_balance: Money,
    /// Fee charged on the operation (principal leg of the payer only)
    pub fee: Money,
    /// VAT charged on the fee (principal leg of the payer only)
    pub tax: Money,
    /// Business operation this leg belongs to
    pub operation_type: OperationType,
    /// Role the leg plays within the operation
    pub role: LegRole,
    /// Accounting date the operation posted under
    pub accounting_date: NaiveDate,
    /// Teller that performed the operation, when one was involved
    pub teller_id: Option<TellerId>,
    /// Reference of the operation this one compensates (reversals)
    pub related_reference: Option<TransactionReference>,
    /// Free-text narration
    pub narration: Option<String>,
    /// When the row was written
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Returns the signed amount of this leg (credits positive, debits negative)
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            PostingDirection::Credit => self.amount.amount(),
            PostingDirection::Debit => -self.amount.amount(),
        }
    }
}

/// Audit row mirroring a posting from the till's perspective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TellerOperationRecord {
    /// Unique identifier
    pub id: TellerOperationId,
    /// Teller whose till moved
    pub teller_id: TellerId,
    /// Branch the operation posted in
    pub branch_id: BranchId,
    /// Business operation
    pub operation_type: OperationType,
    /// Reference code of the orchestrated operation
    pub reference: TransactionReference,
    /// Direction of the till movement
    pub direction: PostingDirection,
    /// Magnitude of the till movement
    pub amount: Money,
    /// Till balance before the movement
    pub previous_balance: Money,
    /// Till balance after the movement
    pub new_balance: Money,
    /// Accounting date the operation posted under
    pub accounting_date: NaiveDate,
    /// When the row was written
    pub created_at: DateTime<Utc>,
}

impl TellerOperationRecord {
    /// Returns the signed amount of the till movement
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            PostingDirection::Credit => self.amount.amount(),
            PostingDirection::Debit => -self.amount.amount(),
        }
    }
}
