//! In-memory store
//!
//! All mutable state sits behind one `RwLock`: reads clone snapshots, and a
//! write set is validated in full before the first mutation, so a rejected
//! set leaves nothing behind. Version tokens step by one on every accepted
//! update, which is what the optimistic retry loop in the services keys on.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::NaiveDate;

use core_kernel::{
    AccountId, AccountingDay, ApprovalRequestId, BranchId, ReferenceKey, ReservationStatus,
    TellerId, TillSessionId, TransactionReference, UserId,
};
use domain_approval::{ApprovalRequest, ApprovalStatus};
use domain_ledger::{Account, GlKind, TellerOperationRecord, TransactionRecord};
use domain_teller::{DailyTeller, Teller, TillSession, TillStatus};

use crate::error::StoreError;
use crate::sequence::ReferenceSequencer;
use crate::writeset::WriteSet;

/// A record together with the version it was read at
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub record: T,
    pub version: u64,
}

impl<T> Versioned<T> {
    fn first(record: T) -> Self {
        Self { record, version: 1 }
    }
}

#[derive(Debug, Default)]
struct Inner {
    accounting_days: HashMap<BranchId, AccountingDay>,
    tellers: HashMap<TellerId, Teller>,
    daily_tellers: Vec<DailyTeller>,
    accounts: HashMap<AccountId, Versioned<Account>>,
    till_accounts: HashMap<TellerId, AccountId>,
    gl_accounts: HashMap<(BranchId, GlKind), AccountId>,
    till_sessions: HashMap<TillSessionId, Versioned<TillSession>>,
    approvals: HashMap<ApprovalRequestId, Versioned<ApprovalRequest>>,
    transactions: Vec<TransactionRecord>,
    teller_operations: Vec<TellerOperationRecord>,
}

/// Shared in-memory store for the posting engine
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    sequencer: ReferenceSequencer,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner.write().map_err(|_| StoreError::LockPoisoned)
    }

    // ------------------------------------------------------------------
    // Seeding and configuration
    // ------------------------------------------------------------------

    /// Sets the current accounting day for a branch, replacing any prior day
    pub fn set_accounting_day(&self, day: AccountingDay) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        inner.accounting_days.insert(day.branch_id, day);
        Ok(())
    }

    pub fn seed_teller(&self, teller: Teller) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        inner.tellers.insert(teller.id, teller);
        Ok(())
    }

    /// Registers a new account at version 1
    pub fn seed_account(&self, account: Account) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner.accounts.contains_key(&account.id) {
            return Err(StoreError::DuplicateEntry(format!(
                "account {}",
                account.id
            )));
        }
        inner.accounts.insert(account.id, Versioned::first(account));
        Ok(())
    }

    /// Binds a teller to its till account
    pub fn bind_till_account(
        &self,
        teller_id: TellerId,
        account_id: AccountId,
    ) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        inner.till_accounts.insert(teller_id, account_id);
        Ok(())
    }

    /// Binds a branch general-ledger position to its account
    pub fn bind_gl_account(
        &self,
        branch_id: BranchId,
        kind: GlKind,
        account_id: AccountId,
    ) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        inner.gl_accounts.insert((branch_id, kind), account_id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn accounting_day(&self, branch_id: BranchId) -> Result<AccountingDay, StoreError> {
        let inner = self.read()?;
        inner
            .accounting_days
            .get(&branch_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("AccountingDay", branch_id))
    }

    pub fn teller(&self, teller_id: TellerId) -> Result<Teller, StoreError> {
        let inner = self.read()?;
        inner
            .tellers
            .get(&teller_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Teller", teller_id))
    }

    pub fn tellers_for_branch(&self, branch_id: BranchId) -> Result<Vec<Teller>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .tellers
            .values()
            .filter(|t| t.branch_id == branch_id)
            .cloned()
            .collect())
    }

    pub fn daily_teller_for_user(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Option<DailyTeller>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .daily_tellers
            .iter()
            .find(|d| d.user_id == user_id && d.accounting_date == date)
            .cloned())
    }

    pub fn daily_teller_for_teller(
        &self,
        teller_id: TellerId,
        date: NaiveDate,
    ) -> Result<Option<DailyTeller>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .daily_tellers
            .iter()
            .find(|d| d.teller_id == teller_id && d.accounting_date == date)
            .cloned())
    }

    pub fn account(&self, account_id: AccountId) -> Result<Versioned<Account>, StoreError> {
        let inner = self.read()?;
        inner
            .accounts
            .get(&account_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Account", account_id))
    }

    pub fn till_account_id(&self, teller_id: TellerId) -> Result<AccountId, StoreError> {
        let inner = self.read()?;
        inner
            .till_accounts
            .get(&teller_id)
            .copied()
            .ok_or_else(|| StoreError::not_found("Till account for teller", teller_id))
    }

    pub fn gl_account_id(&self, branch_id: BranchId, kind: GlKind) -> Result<AccountId, StoreError> {
        let inner = self.read()?;
        inner
            .gl_accounts
            .get(&(branch_id, kind))
            .copied()
            .ok_or_else(|| StoreError::not_found(&format!("{kind} account for branch"), branch_id))
    }

    /// The till session for a teller and date, whatever its status
    pub fn till_session_for(
        &self,
        teller_id: TellerId,
        date: NaiveDate,
    ) -> Result<Option<Versioned<TillSession>>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .till_sessions
            .values()
            .find(|v| v.record.teller_id == teller_id && v.record.accounting_date == date)
            .cloned())
    }

    /// The open till session for a teller and date, if one exists
    pub fn open_till_session(
        &self,
        teller_id: TellerId,
        date: NaiveDate,
    ) -> Result<Option<Versioned<TillSession>>, StoreError> {
        Ok(self
            .till_session_for(teller_id, date)?
            .filter(|v| v.record.status == TillStatus::Ood))
    }

    pub fn approval(
        &self,
        request_id: ApprovalRequestId,
    ) -> Result<Versioned<ApprovalRequest>, StoreError> {
        let inner = self.read()?;
        inner
            .approvals
            .get(&request_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("ApprovalRequest", request_id))
    }

    pub fn approvals_in_status(
        &self,
        status: ApprovalStatus,
    ) -> Result<Vec<ApprovalRequest>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .approvals
            .values()
            .filter(|v| v.record.status == status)
            .map(|v| v.record.clone())
            .collect())
    }

    /// All posted legs carrying the given reference
    pub fn transactions_by_reference(
        &self,
        reference: &TransactionReference,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .transactions
            .iter()
            .filter(|t| &t.reference == reference)
            .cloned()
            .collect())
    }

    pub fn transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .transactions
            .iter()
            .filter(|t| t.account_id == account_id)
            .cloned()
            .collect())
    }

    pub fn teller_operations_for(
        &self,
        teller_id: TellerId,
    ) -> Result<Vec<TellerOperationRecord>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .teller_operations
            .iter()
            .filter(|t| t.teller_id == teller_id)
            .cloned()
            .collect())
    }

    // ------------------------------------------------------------------
    // Reference issuance
    // ------------------------------------------------------------------

    pub fn reserve_reference(&self, key: &ReferenceKey) -> TransactionReference {
        self.sequencer.reserve(key)
    }

    pub fn revert_reference(&self, reference: &TransactionReference) -> Result<(), StoreError> {
        self.sequencer.revert(reference)
    }

    pub fn reference_status(
        &self,
        reference: &TransactionReference,
    ) -> Option<ReservationStatus> {
        self.sequencer.status(reference)
    }

    pub fn references_issued(&self, key: &ReferenceKey) -> u64 {
        self.sequencer.issued(key)
    }

    // ------------------------------------------------------------------
    // Atomic apply
    // ------------------------------------------------------------------

    /// Applies a write set all or nothing.
    ///
    /// Every guard runs before the first mutation: stale version tokens,
    /// colliding inserts, a second session for the same teller and date, a
    /// day assignment that would double-book a user or a teller, and a
    /// commit reference that is not currently reserved. Any failure rejects
    /// the whole set with the store untouched.
    pub fn apply(&self, set: WriteSet) -> Result<(), StoreError> {
        let mut inner = self.write()?;

        for write in &set.accounts {
            let existing = inner
                .accounts
                .get(&write.account.id)
                .ok_or_else(|| StoreError::not_found("Account", write.account.id))?;
            if existing.version != write.expected_version {
                return Err(StoreError::VersionConflict {
                    entity: "Account".to_string(),
                    expected: write.expected_version,
                    actual: existing.version,
                });
            }
        }

        for write in &set.sessions {
            match write.expected_version {
                None => {
                    let collision = inner.till_sessions.values().any(|v| {
                        v.record.teller_id == write.session.teller_id
                            && v.record.accounting_date == write.session.accounting_date
                    });
                    if collision {
                        return Err(StoreError::DuplicateEntry(format!(
                            "till session for teller {} on {}",
                            write.session.teller_id, write.session.accounting_date
                        )));
                    }
                }
                Some(expected) => {
                    let existing = inner
                        .till_sessions
                        .get(&write.session.id)
                        .ok_or_else(|| StoreError::not_found("TillSession", write.session.id))?;
                    if existing.version != expected {
                        return Err(StoreError::VersionConflict {
                            entity: "TillSession".to_string(),
                            expected,
                            actual: existing.version,
                        });
                    }
                }
            }
        }

        for write in &set.approvals {
            match write.expected_version {
                None => {
                    if inner.approvals.contains_key(&write.request.id) {
                        return Err(StoreError::DuplicateEntry(format!(
                            "approval request {}",
                            write.request.id
                        )));
                    }
                }
                Some(expected) => {
                    let existing = inner
                        .approvals
                        .get(&write.request.id)
                        .ok_or_else(|| StoreError::not_found("ApprovalRequest", write.request.id))?;
                    if existing.version != expected {
                        return Err(StoreError::VersionConflict {
                            entity: "ApprovalRequest".to_string(),
                            expected,
                            actual: existing.version,
                        });
                    }
                }
            }
        }

        for daily in &set.daily_tellers {
            let double_booked = inner.daily_tellers.iter().any(|d| {
                d.accounting_date == daily.accounting_date
                    && (d.teller_id == daily.teller_id || d.user_id == daily.user_id)
            });
            if double_booked {
                return Err(StoreError::DuplicateEntry(format!(
                    "daily teller for {} on {}",
                    daily.teller_id, daily.accounting_date
                )));
            }
        }

        if let Some(reference) = &set.commit_reference {
            match self.sequencer.status(reference) {
                Some(ReservationStatus::Reserved) => {}
                Some(status) => {
                    return Err(StoreError::ReferenceState {
                        reference: reference.to_string(),
                        state: format!("{status:?}").to_lowercase(),
                    })
                }
                None => {
                    return Err(StoreError::ReferenceState {
                        reference: reference.to_string(),
                        state: "unknown".to_string(),
                    })
                }
            }
        }

        // Guards passed; from here every mutation succeeds.
        for write in set.accounts {
            let version = write.expected_version + 1;
            inner.accounts.insert(
                write.account.id,
                Versioned {
                    record: write.account,
                    version,
                },
            );
        }
        for write in set.sessions {
            let version = write.expected_version.map(|v| v + 1).unwrap_or(1);
            inner.till_sessions.insert(
                write.session.id,
                Versioned {
                    record: write.session,
                    version,
                },
            );
        }
        for write in set.approvals {
            let version = write.expected_version.map(|v| v + 1).unwrap_or(1);
            inner.approvals.insert(
                write.request.id,
                Versioned {
                    record: write.request,
                    version,
                },
            );
        }
        inner.daily_tellers.extend(set.daily_tellers);
        inner.transactions.extend(set.transactions);
        inner.teller_operations.extend(set.teller_operations);

        if let Some(reference) = &set.commit_reference {
            // Checked above while holding the write lock, so this cannot fail.
            self.sequencer.commit(reference)?;
        }
        Ok(())
    }
}
