//! Accounting time
//!
//! Posting dates come from each branch's accounting day, not from the wall
//! clock. A branch's day is opened by back-office day-start processing and
//! stays current until day-end runs; every posting resolves its date here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::BranchId;

/// The current accounting day of a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingDay {
    /// Branch this day belongs to
    pub branch_id: BranchId,
    /// The posting date for every operation in this branch
    pub date: NaiveDate,
    /// When the day was opened (wall clock, audit only)
    pub opened_at: DateTime<Utc>,
}

impl AccountingDay {
    /// Opens an accounting day for a branch
    pub fn open(branch_id: BranchId, date: NaiveDate) -> Self {
        Self {
            branch_id,
            date,
            opened_at: Utc::now(),
        }
    }

    /// Returns true if this day posts on the given date
    pub fn is_for(&self, date: NaiveDate) -> bool {
        self.date == date
    }
}
