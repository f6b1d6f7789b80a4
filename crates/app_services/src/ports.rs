//! Outbound ports
//!
//! The engine reaches the rest of the bank through three narrow interfaces:
//! the branch directory (branch codes for reference issuance), the customer
//! directory (member contact details for notices), and the notifier. In-
//! process implementations back the development setup and the test suites.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use core_kernel::{
    AccountId, BranchId, MemberId, Money, OperationType, PortError, PostingDirection,
    TransactionReference,
};

/// Identity of a branch as the wider bank knows it
#[derive(Debug, Clone)]
pub struct BranchInfo {
    pub id: BranchId,
    /// Short numeric code embedded in transaction references
    pub code: String,
    pub name: String,
}

/// Member details needed for notices
#[derive(Debug, Clone)]
pub struct MemberInfo {
    pub id: MemberId,
    pub name: String,
    pub phone: Option<String>,
}

/// A posting notice sent after a successful commit
#[derive(Debug, Clone)]
pub struct PostingNotice {
    pub reference: TransactionReference,
    pub account_id: AccountId,
    pub operation_type: OperationType,
    pub direction: PostingDirection,
    pub amount: Money,
    pub new_balance: Money,
}

/// Resolves branches for reference issuance
#[async_trait]
pub trait BranchDirectory: Send + Sync {
    async fn branch(&self, branch_id: BranchId) -> Result<BranchInfo, PortError>;
}

/// Resolves the member behind an account
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn member_for_account(&self, account_id: AccountId) -> Result<MemberInfo, PortError>;
}

/// Delivers posting notices. Failures are logged, never propagated into the
/// posting result.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_posting(&self, member: &MemberInfo, notice: &PostingNotice)
        -> Result<(), PortError>;
}

/// Branch directory backed by a fixed map
#[derive(Debug, Default)]
pub struct StaticBranchDirectory {
    branches: HashMap<BranchId, BranchInfo>,
}

impl StaticBranchDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch(mut self, info: BranchInfo) -> Self {
        self.branches.insert(info.id, info);
        self
    }
}

#[async_trait]
impl BranchDirectory for StaticBranchDirectory {
    async fn branch(&self, branch_id: BranchId) -> Result<BranchInfo, PortError> {
        self.branches
            .get(&branch_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Branch", branch_id))
    }
}

/// Customer directory backed by an in-process map
#[derive(Debug, Default)]
pub struct StaticCustomerDirectory {
    members: Mutex<HashMap<AccountId, MemberInfo>>,
}

impl StaticCustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(self, account_id: AccountId, info: MemberInfo) -> Self {
        self.register(account_id, info);
        self
    }

    /// Adds a member after construction, e.g. while seeding accounts
    pub fn register(&self, account_id: AccountId, info: MemberInfo) {
        if let Ok(mut members) = self.members.lock() {
            members.insert(account_id, info);
        }
    }
}

#[async_trait]
impl CustomerDirectory for StaticCustomerDirectory {
    async fn member_for_account(&self, account_id: AccountId) -> Result<MemberInfo, PortError> {
        self.members
            .lock()
            .map_err(|_| PortError::internal("customer directory mutex poisoned"))?
            .get(&account_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Member for account", account_id))
    }
}

/// Notifier that remembers everything it was asked to send
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<PostingNotice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices delivered so far
    pub fn sent(&self) -> Vec<PostingNotice> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_posting(
        &self,
        _member: &MemberInfo,
        notice: &PostingNotice,
    ) -> Result<(), PortError> {
        self.sent
            .lock()
            .map_err(|_| PortError::internal("notifier mutex poisoned"))?
            .push(notice.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_branch_directory_resolves_seeded_branches() {
        let branch = BranchId::new();
        let directory = StaticBranchDirectory::new().with_branch(BranchInfo {
            id: branch,
            code: "001".to_string(),
            name: "Head Office".to_string(),
        });
        let info = directory.branch(branch).await.unwrap();
        assert_eq!(info.code, "001");
        assert!(directory.branch(BranchId::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_recording_notifier_keeps_notices() {
        let notifier = RecordingNotifier::new();
        let member = MemberInfo {
            id: MemberId::new(),
            name: "Asha Mrisho".to_string(),
            phone: Some("+255700000001".to_string()),
        };
        let notice = PostingNotice {
            reference: TransactionReference::from_code("CD-001-20250314-00001"),
            account_id: AccountId::new(),
            operation_type: OperationType::CashDeposit,
            direction: PostingDirection::Credit,
            amount: Money::zero(core_kernel::Currency::TZS),
            new_balance: Money::zero(core_kernel::Currency::TZS),
        };
        notifier.notify_posting(&member, &notice).await.unwrap();
        assert_eq!(notifier.sent().len(), 1);
    }
}
