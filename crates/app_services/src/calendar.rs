//! Accounting day service
//!
//! Each branch runs its own business date, advanced by an explicit day-open
//! call. Postings always date themselves from here, never from the wall
//! clock, so a branch that opens late or runs past midnight stays coherent.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use core_kernel::{AccountingDay, BranchId, OperationError};
use infra_store::MemoryStore;

/// Tracks and advances the accounting day per branch
#[derive(Clone)]
pub struct AccountingCalendar {
    store: Arc<MemoryStore>,
}

impl AccountingCalendar {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// The branch's current accounting day
    pub fn current_day(&self, branch_id: BranchId) -> Result<AccountingDay, OperationError> {
        Ok(self.store.accounting_day(branch_id)?)
    }

    /// Opens a new accounting day for the branch.
    ///
    /// Days only move forward; reopening the current date or rolling back
    /// is refused.
    pub fn open_day(
        &self,
        branch_id: BranchId,
        date: NaiveDate,
    ) -> Result<AccountingDay, OperationError> {
        if let Ok(current) = self.store.accounting_day(branch_id) {
            if date <= current.date {
                return Err(OperationError::validation(format!(
                    "Accounting day for branch {} is already at {}; cannot open {}",
                    branch_id, current.date, date
                )));
            }
        }
        let day = AccountingDay::open(branch_id, date);
        self.store.set_accounting_day(day.clone())?;
        info!(branch = %branch_id, date = %date, "accounting day opened");
        Ok(day)
    }
}
