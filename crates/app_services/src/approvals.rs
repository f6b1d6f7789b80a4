//! Approval workflow service
//!
//! Submit raises a request after checking the payload would stand a chance
//! of settling; validate, approve, reject and treat drive the state graph.
//! Settlement timing depends on the payload: a none-cash operation posts
//! when it is approved, reversals and remittance payouts post when a teller
//! treats them. Status stamps and settlement rows always land in the same
//! write set, so a request is never marked further along than its posting.

use std::sync::Arc;

use tracing::info;

use core_kernel::{ApprovalRequestId, OperationError, OperationType, PostingDirection};
use domain_approval::{ApprovalPayload, ApprovalRequest, ApprovalStatus, Settlement};
use infra_store::{MemoryStore, WriteSet};

use crate::context::OperatorContext;
use crate::posting::{PostingOrchestrator, PostingReceipt};

/// What an approval action returned: the request as stored, and the
/// settlement receipt when the action posted
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub request: ApprovalRequest,
    pub receipt: Option<PostingReceipt>,
}

/// Maker-checker workflow over reversal, none-cash and remittance payloads
pub struct ApprovalService {
    store: Arc<MemoryStore>,
    posting: Arc<PostingOrchestrator>,
}

impl ApprovalService {
    pub fn new(store: Arc<MemoryStore>, posting: Arc<PostingOrchestrator>) -> Self {
        Self { store, posting }
    }

    /// Raises a request in Pending.
    ///
    /// The payload is checked up front so obviously unsettleable requests
    /// never enter the queue: a reversal must point at posted legs that are
    /// not already reversed, and a none-cash movement must clear the account
    /// floor at today's balance. The authoritative funds check still runs at
    /// settlement.
    pub fn submit(
        &self,
        ctx: &OperatorContext,
        payload: ApprovalPayload,
        narration: Option<String>,
    ) -> Result<ApprovalRequest, OperationError> {
        self.check_payload(&payload)?;

        let request = ApprovalRequest::submit(ctx.branch_id, payload, ctx.user_id, narration);
        let mut set = WriteSet::new();
        set.insert_approval(request.clone());
        self.store.apply(set)?;

        info!(
            correlation_id = %ctx.correlation_id,
            request = %request.id,
            payload = request.payload.label(),
            "approval request submitted"
        );
        Ok(request)
    }

    /// Moves a Pending request to Validated
    pub fn validate_request(
        &self,
        ctx: &OperatorContext,
        request_id: ApprovalRequestId,
        comment: Option<String>,
    ) -> Result<ApprovalRequest, OperationError> {
        let versioned = self.store.approval(request_id)?;
        let mut updated = versioned.record.clone();
        updated.validate(ctx.user_id, comment)?;

        let mut set = WriteSet::new();
        set.update_approval(updated.clone(), versioned.version);
        self.store.apply(set)?;

        info!(
            correlation_id = %ctx.correlation_id,
            request = %request_id,
            "approval request validated"
        );
        Ok(updated)
    }

    /// Moves a Validated request to Approved.
    ///
    /// A none-cash payload settles here: its ledger rows, the posted
    /// reference and the Approved stamp commit together. Payloads that
    /// settle on treat only change status.
    pub async fn approve(
        &self,
        ctx: &OperatorContext,
        request_id: ApprovalRequestId,
        comment: Option<String>,
    ) -> Result<ApprovalOutcome, OperationError> {
        let versioned = self.store.approval(request_id)?;
        let mut updated = versioned.record.clone();
        updated.approve(ctx.user_id, comment)?;

        let outcome = match updated.payload.settlement() {
            Settlement::OnApprove => {
                let receipt = self
                    .posting
                    .settle_none_cash(ctx, updated, versioned.version)
                    .await?;
                let stored = self.store.approval(request_id)?.record;
                ApprovalOutcome {
                    request: stored,
                    receipt: Some(receipt),
                }
            }
            Settlement::OnTreat => {
                let mut set = WriteSet::new();
                set.update_approval(updated.clone(), versioned.version);
                self.store.apply(set)?;
                ApprovalOutcome {
                    request: updated,
                    receipt: None,
                }
            }
        };

        info!(
            correlation_id = %ctx.correlation_id,
            request = %request_id,
            posted = outcome.receipt.is_some(),
            "approval request approved"
        );
        Ok(outcome)
    }

    /// Moves a Validated request to Rejected. The initiator may withdraw
    /// their own request this way.
    pub fn reject(
        &self,
        ctx: &OperatorContext,
        request_id: ApprovalRequestId,
        comment: Option<String>,
    ) -> Result<ApprovalRequest, OperationError> {
        let versioned = self.store.approval(request_id)?;
        let mut updated = versioned.record.clone();
        updated.reject(ctx.user_id, comment)?;

        let mut set = WriteSet::new();
        set.update_approval(updated.clone(), versioned.version);
        self.store.apply(set)?;

        info!(
            correlation_id = %ctx.correlation_id,
            request = %request_id,
            "approval request rejected"
        );
        Ok(updated)
    }

    /// Moves an Approved request to Treated and posts its settlement.
    ///
    /// Treating hands cash over the counter, so the acting user must hold a
    /// teller with the matching right and, for cash-bearing legs, an open
    /// till. The Treated stamp, the posted reference and the rows commit
    /// together.
    pub async fn treat(
        &self,
        ctx: &OperatorContext,
        request_id: ApprovalRequestId,
        comment: Option<String>,
    ) -> Result<ApprovalOutcome, OperationError> {
        let versioned = self.store.approval(request_id)?;
        let mut updated = versioned.record.clone();
        updated.treat(ctx.user_id, comment)?;

        if updated.payload.settlement() == Settlement::OnApprove {
            return Err(OperationError::validation(format!(
                "A {} request settles when it is approved; there is nothing to treat",
                updated.payload.label()
            )));
        }

        let receipt = self
            .posting
            .settle_on_treat(ctx, updated, versioned.version)
            .await?;
        let stored = self.store.approval(request_id)?.record;

        info!(
            correlation_id = %ctx.correlation_id,
            request = %request_id,
            reference = %receipt.reference,
            "approval request treated"
        );
        Ok(ApprovalOutcome {
            request: stored,
            receipt: Some(receipt),
        })
    }

    /// One request by id
    pub fn request(&self, request_id: ApprovalRequestId) -> Result<ApprovalRequest, OperationError> {
        Ok(self.store.approval(request_id)?.record)
    }

    /// All requests sitting in the given status
    pub fn queue(&self, status: ApprovalStatus) -> Result<Vec<ApprovalRequest>, OperationError> {
        Ok(self.store.approvals_in_status(status)?)
    }

    fn check_payload(&self, payload: &ApprovalPayload) -> Result<(), OperationError> {
        match payload {
            ApprovalPayload::Reversal {
                original_reference,
                reason,
            } => {
                if reason.trim().is_empty() {
                    return Err(OperationError::validation(
                        "A reversal request must state its reason",
                    ));
                }
                let originals = self.store.transactions_by_reference(original_reference)?;
                if originals.is_empty() {
                    return Err(OperationError::not_found(format!(
                        "No posted legs under reference {original_reference}"
                    )));
                }
                if originals
                    .iter()
                    .any(|row| row.operation_type == OperationType::Reversal)
                {
                    return Err(OperationError::validation(
                        "A reversal cannot itself be reversed",
                    ));
                }
                self.posting.ensure_not_reversed(original_reference, &originals)
            }
            ApprovalPayload::NoneCash {
                account_id,
                direction,
                amount,
                ..
            } => {
                if !amount.is_positive() {
                    return Err(OperationError::validation(
                        "Amount must be strictly positive",
                    ));
                }
                // Probe a copy so insufficient funds and inactive accounts
                // surface at submit instead of at approval.
                let mut probe = self.store.account(*account_id)?.record;
                match direction {
                    PostingDirection::Debit => probe.debit(amount)?,
                    PostingDirection::Credit => probe.credit(amount)?,
                }
                Ok(())
            }
            ApprovalPayload::RemittancePayout { .. } => Err(OperationError::validation(
                "Payout requests are raised by remittance funding, not submitted directly",
            )),
        }
    }
}
