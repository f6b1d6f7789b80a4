//! Tellers and their daily assignment to users
//!
//! A teller is a configured operating point in a branch. It does not act by
//! itself: a user holds it for one accounting day through a [`DailyTeller`]
//! record, and everything the pair may do is bounded by the teller's kind
//! and rights.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BranchId, DailyTellerId, OperationType, TellerId, UserId};

use crate::error::TellerError;

/// Kind of teller, fixed at configuration time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TellerKind {
    /// Holds the branch float and provisions the sub tills
    Primary,
    /// Customer-facing till funded from the primary till
    Sub,
    /// Book-entry operating point with no drawer
    NoneCash,
}

impl TellerKind {
    /// Returns true if the kind permits the operation at all, before any
    /// per-teller rights are considered.
    pub fn admits(&self, operation: OperationType) -> bool {
        match self {
            TellerKind::Primary | TellerKind::Sub => true,
            TellerKind::NoneCash => !operation.moves_drawer_cash(),
        }
    }

    /// Rights granted to a freshly configured teller of this kind
    pub fn default_rights(&self) -> Vec<OperationType> {
        match self {
            TellerKind::Primary => vec![
                OperationType::CashDeposit,
                OperationType::CashWithdrawal,
                OperationType::NoneCashDebit,
                OperationType::NoneCashCredit,
                OperationType::TillOpening,
                OperationType::TillReplenishment,
                OperationType::Reversal,
                OperationType::RemittanceFunding,
                OperationType::RemittancePayout,
            ],
            TellerKind::Sub => vec![
                OperationType::CashDeposit,
                OperationType::CashWithdrawal,
                OperationType::NoneCashDebit,
                OperationType::NoneCashCredit,
                OperationType::TillOpening,
                OperationType::TillReplenishment,
                OperationType::RemittanceFunding,
                OperationType::RemittancePayout,
            ],
            TellerKind::NoneCash => vec![
                OperationType::NoneCashDebit,
                OperationType::NoneCashCredit,
            ],
        }
    }
}

/// A configured teller within a branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teller {
    /// Unique teller identifier
    pub id: TellerId,
    /// Branch the teller belongs to
    pub branch_id: BranchId,
    /// Display name, e.g. "Counter 3"
    pub name: String,
    /// Primary, sub or none-cash
    pub kind: TellerKind,
    /// Operation types this teller may perform
    pub rights: Vec<OperationType>,
    /// Whether the teller is usable
    pub active: bool,
    /// When the teller was configured
    pub created_at: DateTime<Utc>,
    /// When the teller was last updated
    pub updated_at: DateTime<Utc>,
}

impl Teller {
    /// Creates a teller with the default rights for its kind
    pub fn new(branch_id: BranchId, name: impl Into<String>, kind: TellerKind) -> Self {
        let now = Utc::now();
        Self {
            id: TellerId::new(),
            branch_id,
            name: name.into(),
            kind,
            rights: kind.default_rights(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the default rights with an explicit set
    pub fn with_rights(mut self, rights: Vec<OperationType>) -> Self {
        self.rights = rights;
        self
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }

    /// Checks that this teller may perform the operation.
    ///
    /// The kind gate runs before the rights list, so a none-cash teller is
    /// refused cash work even if misconfigured with a cash right.
    pub fn may_perform(&self, operation: OperationType) -> Result<(), TellerError> {
        if !self.active {
            return Err(TellerError::InactiveTeller(self.id.to_string()));
        }
        if !self.kind.admits(operation) || !self.rights.contains(&operation) {
            return Err(TellerError::RightsViolation {
                teller: self.id.to_string(),
                operation,
            });
        }
        Ok(())
    }

    pub fn is_primary(&self) -> bool {
        self.kind == TellerKind::Primary
    }
}

/// Binds a user to a teller for one accounting day
///
/// At most one active record may exist per teller per date, and a user holds
/// at most one teller per date. The store enforces both; this type carries
/// the audit fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTeller {
    /// Unique assignment identifier
    pub id: DailyTellerId,
    /// The teller being held
    pub teller_id: TellerId,
    /// The user holding it
    pub user_id: UserId,
    /// Branch of the teller
    pub branch_id: BranchId,
    /// Accounting date the assignment covers
    pub accounting_date: NaiveDate,
    /// Supervisor who made the assignment
    pub assigned_by: UserId,
    /// When the assignment was made
    pub assigned_at: DateTime<Utc>,
}

impl DailyTeller {
    pub fn assign(
        teller: &Teller,
        user_id: UserId,
        accounting_date: NaiveDate,
        assigned_by: UserId,
    ) -> Self {
        Self {
            id: DailyTellerId::new(),
            teller_id: teller.id,
            user_id,
            branch_id: teller.branch_id,
            accounting_date,
            assigned_by,
            assigned_at: Utc::now(),
        }
    }

    /// Returns true if this assignment belongs to the given user
    pub fn held_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Returns true if this assignment covers the given date
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.accounting_date == date
    }
}
