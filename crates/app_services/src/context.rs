//! Operator context

use uuid::Uuid;

use core_kernel::{BranchId, UserId};

/// Who is acting, from where, under which correlation id
///
/// Every inbound operation carries one of these. The correlation id ties the
/// log lines of one request together and is echoed on internal failures.
#[derive(Debug, Clone)]
pub struct OperatorContext {
    /// Acting user
    pub user_id: UserId,
    /// Branch the user is operating in
    pub branch_id: BranchId,
    /// Correlation id for logs and error reports
    pub correlation_id: Uuid,
}

impl OperatorContext {
    pub fn new(user_id: UserId, branch_id: BranchId) -> Self {
        Self {
            user_id,
            branch_id,
            correlation_id: Uuid::new_v4(),
        }
    }

    /// Keeps an externally supplied correlation id
    pub fn with_correlation(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = correlation_id;
        self
    }
}
