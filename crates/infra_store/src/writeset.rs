//! Staged write sets
//!
//! An orchestrated operation computes everything it wants to persist, stages
//! it here, and hands the whole set to the store in one call. Version tokens
//! captured at read time ride along so the store can refuse the set if any
//! touched row moved underneath the caller.

use domain_approval::ApprovalRequest;
use domain_ledger::{Account, TellerOperationRecord, TransactionRecord};
use domain_teller::{DailyTeller, TillSession};

use core_kernel::TransactionReference;

/// An account update guarded by the version seen at read time
#[derive(Debug, Clone)]
pub struct AccountWrite {
    pub account: Account,
    pub expected_version: u64,
}

/// A till session insert or guarded update
#[derive(Debug, Clone)]
pub struct SessionWrite {
    pub session: TillSession,
    /// None inserts a new session; Some guards an update
    pub expected_version: Option<u64>,
}

/// An approval request insert or guarded update
#[derive(Debug, Clone)]
pub struct ApprovalWrite {
    pub request: ApprovalRequest,
    /// None inserts a new request; Some guards an update
    pub expected_version: Option<u64>,
}

/// Everything one operation wants persisted, applied all or nothing
#[derive(Debug, Default)]
pub struct WriteSet {
    pub accounts: Vec<AccountWrite>,
    pub sessions: Vec<SessionWrite>,
    pub approvals: Vec<ApprovalWrite>,
    pub daily_tellers: Vec<DailyTeller>,
    pub transactions: Vec<TransactionRecord>,
    pub teller_operations: Vec<TellerOperationRecord>,
    /// Reference to flip from reserved to committed once the set lands
    pub commit_reference: Option<TransactionReference>,
}

impl WriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages an account mutation guarded by the version it was read at
    pub fn update_account(&mut self, account: Account, expected_version: u64) -> &mut Self {
        self.accounts.push(AccountWrite {
            account,
            expected_version,
        });
        self
    }

    /// Stages a brand new till session
    pub fn insert_session(&mut self, session: TillSession) -> &mut Self {
        self.sessions.push(SessionWrite {
            session,
            expected_version: None,
        });
        self
    }

    /// Stages an update to an existing till session
    pub fn update_session(&mut self, session: TillSession, expected_version: u64) -> &mut Self {
        self.sessions.push(SessionWrite {
            session,
            expected_version: Some(expected_version),
        });
        self
    }

    /// Stages a brand new approval request
    pub fn insert_approval(&mut self, request: ApprovalRequest) -> &mut Self {
        self.approvals.push(ApprovalWrite {
            request,
            expected_version: None,
        });
        self
    }

    /// Stages an update to an existing approval request
    pub fn update_approval(&mut self, request: ApprovalRequest, expected_version: u64) -> &mut Self {
        self.approvals.push(ApprovalWrite {
            request,
            expected_version: Some(expected_version),
        });
        self
    }

    /// Stages a day assignment of a user to a teller
    pub fn insert_daily_teller(&mut self, daily: DailyTeller) -> &mut Self {
        self.daily_tellers.push(daily);
        self
    }

    /// Appends an immutable transaction row
    pub fn append_transaction(&mut self, row: TransactionRecord) -> &mut Self {
        self.transactions.push(row);
        self
    }

    /// Appends an immutable teller operation row
    pub fn append_teller_operation(&mut self, row: TellerOperationRecord) -> &mut Self {
        self.teller_operations.push(row);
        self
    }

    /// Asks the store to commit this reservation together with the set
    pub fn commit_reference(&mut self, reference: TransactionReference) -> &mut Self {
        self.commit_reference = Some(reference);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
            && self.sessions.is_empty()
            && self.approvals.is_empty()
            && self.daily_tellers.is_empty()
            && self.transactions.is_empty()
            && self.teller_operations.is_empty()
            && self.commit_reference.is_none()
    }
}
