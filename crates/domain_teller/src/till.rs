//! Till sessions: the custody record of one teller's drawer for one day
//!
//! A session is created at open-of-day, its replenishment figures grow during
//! the day, and close-of-day freezes it. Closed is terminal for the date.
//! Whether a session may be created at all (no other open session for the
//! teller, primary open before sub) depends on what the store already holds,
//! so those checks live in the till service; this type owns the per-record
//! state machine and the denomination invariants.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BranchId, Money, TellerId, TillSessionId, TransactionReference, UserId};

use crate::denomination::CashBreakdown;
use crate::error::TellerError;
use crate::teller::{Teller, TellerKind};

/// Status of a till session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TillStatus {
    /// Open of day: the drawer is provisioned and accepting operations
    Ood,
    /// Closed for the date
    Closed,
}

impl TillStatus {
    /// Returns true if transitioning from this status to the target is allowed
    pub fn can_transition_to(&self, target: TillStatus) -> bool {
        matches!((self, target), (TillStatus::Ood, TillStatus::Closed))
    }
}

impl fmt::Display for TillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TillStatus::Ood => write!(f, "OOD"),
            TillStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

/// One teller's till custody record for one accounting date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TillSession {
    /// Unique session identifier
    pub id: TillSessionId,
    /// Teller whose drawer this is
    pub teller_id: TellerId,
    /// Branch of the teller
    pub branch_id: BranchId,
    /// Kind of the teller at open time
    pub teller_kind: TellerKind,
    /// Accounting date the session covers
    pub accounting_date: NaiveDate,
    /// Current status
    pub status: TillStatus,
    /// Amount provisioned at open
    pub opening_amount: Money,
    /// Counted notes and coins at open
    pub opening_denominations: CashBreakdown,
    /// Reference of the provisioning posting
    pub opening_reference: TransactionReference,
    /// User who performed the open
    pub opened_by: UserId,
    /// When the session was opened
    pub opened_at: DateTime<Utc>,
    /// Total replenished so far today
    pub replenished_total: Money,
    /// Number of replenishments received
    pub replenishment_count: u32,
    /// Accumulated replenishment notes and coins
    pub replenishment_denominations: CashBreakdown,
    /// When the drawer was last topped up
    pub last_replenished_at: Option<DateTime<Utc>>,
    /// Cash counted in the drawer at close
    pub closing_amount: Option<Money>,
    /// Counted notes and coins at close
    pub closing_denominations: Option<CashBreakdown>,
    /// User who performed the close
    pub closed_by: Option<UserId>,
    /// When the session was closed
    pub closed_at: Option<DateTime<Utc>>,
    /// Free-text comment captured at close
    pub closing_narration: Option<String>,
}

impl TillSession {
    /// Opens a session after checking the declared amount against its
    /// denomination breakdown. Mismatches fail before anything is built.
    pub fn open(
        teller: &Teller,
        accounting_date: NaiveDate,
        opening_amount: Money,
        opening_denominations: CashBreakdown,
        opening_reference: TransactionReference,
        opened_by: UserId,
    ) -> Result<Self, TellerError> {
        opening_denominations.verify_against(&opening_amount)?;
        Ok(Self {
            id: TillSessionId::new(),
            teller_id: teller.id,
            branch_id: teller.branch_id,
            teller_kind: teller.kind,
            accounting_date,
            status: TillStatus::Ood,
            opening_amount,
            opening_denominations,
            opening_reference,
            opened_by,
            opened_at: Utc::now(),
            replenished_total: Money::zero(opening_amount.currency()),
            replenishment_count: 0,
            replenishment_denominations: CashBreakdown::new(opening_amount.currency()),
            last_replenished_at: None,
            closing_amount: None,
            closing_denominations: None,
            closed_by: None,
            closed_at: None,
            closing_narration: None,
        })
    }

    pub fn is_open(&self) -> bool {
        self.status == TillStatus::Ood
    }

    /// Fails with the closed-till error unless the session is still open
    pub fn ensure_open(&self) -> Result<(), TellerError> {
        if !self.is_open() {
            return Err(TellerError::TillClosed {
                teller: self.teller_id.to_string(),
                date: self.accounting_date,
            });
        }
        Ok(())
    }

    /// Folds a replenishment into the session figures.
    ///
    /// The existing record is incremented, never replaced: totals grow, the
    /// count steps up and the breakdown merges into what is already there.
    pub fn record_replenishment(
        &mut self,
        amount: Money,
        denominations: &CashBreakdown,
    ) -> Result<(), TellerError> {
        self.ensure_open()?;
        denominations.verify_against(&amount)?;
        self.replenished_total = self.replenished_total.checked_add(&amount)?;
        self.replenishment_count += 1;
        self.replenishment_denominations.merge(denominations);
        self.last_replenished_at = Some(Utc::now());
        Ok(())
    }

    /// Closes the session, recording the counted drawer and the closer.
    ///
    /// The declared cash at hand must match its breakdown; it is not required
    /// to match the till account balance, since any over or short shows up as
    /// the difference between the two.
    pub fn close(
        &mut self,
        cash_at_hand: Money,
        closing_denominations: CashBreakdown,
        closed_by: UserId,
        narration: Option<String>,
    ) -> Result<(), TellerError> {
        if !self.status.can_transition_to(TillStatus::Closed) {
            return Err(TellerError::TillAlreadyClosed {
                teller: self.teller_id.to_string(),
                date: self.accounting_date,
            });
        }
        closing_denominations.verify_against(&cash_at_hand)?;
        self.status = TillStatus::Closed;
        self.closing_amount = Some(cash_at_hand);
        self.closing_denominations = Some(closing_denominations);
        self.closed_by = Some(closed_by);
        self.closed_at = Some(Utc::now());
        self.closing_narration = narration;
        Ok(())
    }

    /// Opening amount plus everything replenished since
    pub fn provisioned_total(&self) -> Result<Money, TellerError> {
        Ok(self.opening_amount.checked_add(&self.replenished_total)?)
    }
}
