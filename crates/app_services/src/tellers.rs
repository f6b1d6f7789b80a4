//! Teller registry service
//!
//! Resolves who is acting: which teller a user holds today, whether that
//! teller may perform an operation, and which teller carries the branch
//! float.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use core_kernel::{BranchId, OperationError, TellerId, UserId};
use domain_teller::{DailyTeller, Teller, TellerError, TellerKind};
use infra_store::{MemoryStore, WriteSet};

/// Teller identity and daily assignment lookups
#[derive(Clone)]
pub struct TellerRegistry {
    store: Arc<MemoryStore>,
}

impl TellerRegistry {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Assigns a user to a teller for one accounting day.
    ///
    /// The store refuses the write if the teller or the user is already
    /// booked for that date.
    pub fn assign_daily(
        &self,
        teller_id: TellerId,
        user_id: UserId,
        date: NaiveDate,
        assigned_by: UserId,
    ) -> Result<DailyTeller, OperationError> {
        let teller = self.store.teller(teller_id)?;
        if !teller.active {
            return Err(TellerError::InactiveTeller(teller.id.to_string()).into());
        }
        let daily = DailyTeller::assign(&teller, user_id, date, assigned_by);
        let mut set = WriteSet::new();
        set.insert_daily_teller(daily.clone());
        self.store.apply(set)?;
        info!(teller = %teller_id, user = %user_id, date = %date, "daily teller assigned");
        Ok(daily)
    }

    /// The teller a user holds on the given date, with the assignment record
    pub fn resolve_for_user(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<(Teller, DailyTeller), OperationError> {
        let daily = self
            .store
            .daily_teller_for_user(user_id, date)?
            .ok_or_else(|| TellerError::NoDailyAssignment {
                user: user_id.to_string(),
                date,
            })?;
        let teller = self.store.teller(daily.teller_id)?;
        Ok((teller, daily))
    }

    /// Checks that a user holds the given teller on the date
    pub fn ensure_holder(
        &self,
        user_id: UserId,
        teller_id: TellerId,
        date: NaiveDate,
    ) -> Result<Teller, OperationError> {
        let holder = self.store.daily_teller_for_teller(teller_id, date)?;
        match holder {
            Some(daily) if daily.held_by(user_id) => Ok(self.store.teller(teller_id)?),
            Some(daily) => Err(TellerError::TellerHeldByAnother {
                teller: teller_id.to_string(),
                holder: daily.user_id.to_string(),
                date,
            }
            .into()),
            None => Err(TellerError::NoDailyAssignment {
                user: user_id.to_string(),
                date,
            }
            .into()),
        }
    }

    /// The active primary teller of a branch
    pub fn primary_teller(&self, branch_id: BranchId) -> Result<Teller, OperationError> {
        self.store
            .tellers_for_branch(branch_id)?
            .into_iter()
            .find(|t| t.kind == TellerKind::Primary && t.active)
            .ok_or_else(|| {
                OperationError::validation(format!(
                    "Branch {branch_id} has no active primary teller configured"
                ))
            })
    }
}
