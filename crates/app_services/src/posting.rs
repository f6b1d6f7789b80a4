//! The posting orchestrator
//!
//! Every operation that moves money runs through [`PostingOrchestrator`],
//! which executes the same sequence each time:
//!
//! 1. resolve the branch accounting day
//! 2. resolve and rights-check the acting teller
//! 3. reserve a transaction reference
//! 4. validate funds and parameters while building the leg set
//! 5. mutate balances on snapshots
//! 6. write the transaction and teller-operation rows
//! 7. commit the reference together with the rows
//!
//! Steps 5 to 7 land through one atomic write set. If anything fails after
//! the reservation, the reference is reverted and nothing is persisted. A
//! lost optimistic version race retries the whole read-mutate-stage cycle;
//! business-rule failures never retry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tokio::time::sleep;
use tracing::{debug, info, warn};
use validator::Validate;

use core_kernel::{
    AccountId, LegRole, Money, OperationError, OperationType, PostingDirection, ReferenceKey,
    TellerId, TellerOperationId, TransactionId, TransactionReference,
};
use domain_approval::{ApprovalPayload, ApprovalRequest};
use domain_ledger::{
    AccountHolder, ChargeSchedule, GlKind, LedgerEntry, TellerOperationRecord, TransactionRecord,
};
use domain_teller::{TellerError, TillSession};
use infra_store::{MemoryStore, WriteSet};

use crate::calendar::AccountingCalendar;
use crate::context::OperatorContext;
use crate::ports::{BranchDirectory, CustomerDirectory, Notifier, PostingNotice};
use crate::tellers::TellerRegistry;

/// A teller-counter request against a member account
#[derive(Debug, Clone, Validate)]
pub struct MemberPostingRequest {
    /// Member account to post against
    pub account_id: AccountId,
    /// Cash deposit or cash withdrawal
    pub operation: OperationType,
    /// Amount of the operation
    pub amount: Money,
    /// Free-text narration for the ledger rows
    #[validate(length(max = 200))]
    pub narration: Option<String>,
}

/// A walk-in remittance funding request
#[derive(Debug, Clone, Validate)]
pub struct RemittanceFundingRequest {
    /// Who will collect the payout
    #[validate(length(min = 1, max = 120))]
    pub beneficiary: String,
    /// Principal to remit, excluding charges
    pub amount: Money,
    #[validate(length(max = 200))]
    pub narration: Option<String>,
}

/// What a successful posting returns to the caller
#[derive(Debug, Clone)]
pub struct PostingReceipt {
    /// Committed transaction reference
    pub reference: TransactionReference,
    /// Operation that posted
    pub operation: OperationType,
    /// Principal amount
    pub amount: Money,
    /// Fee charged
    pub fee: Money,
    /// VAT charged on the fee
    pub tax: Money,
    /// Accounting date the operation posted under
    pub accounting_date: NaiveDate,
    /// New balance of the member account, when one was involved
    pub new_balance: Option<Money>,
    /// The posted legs
    pub legs: Vec<TransactionRecord>,
}

/// Everything one operation wants executed, built by the flow methods and
/// consumed by [`PostingOrchestrator::execute`]
pub(crate) struct PostingPlan {
    pub operation: OperationType,
    pub branch_id: core_kernel::BranchId,
    pub accounting_date: NaiveDate,
    pub reference: TransactionReference,
    pub entry: LedgerEntry,
    pub fee: Money,
    pub tax: Money,
    /// Account whose principal-role row carries the fee and tax figures
    pub fee_on: Option<AccountId>,
    /// Teller stamped on the rows
    pub teller_id: Option<TellerId>,
    /// Till accounts whose rows are mirrored as teller operations
    pub tills: Vec<(TellerId, AccountId)>,
    /// Account whose credit leg runs as a balance reset (till provisioning)
    pub reset_balance: Option<(AccountId, Money)>,
    pub related_reference: Option<TransactionReference>,
    pub narration: Option<String>,
    /// Till session to insert with the rows
    pub session_insert: Option<TillSession>,
    /// Till session to update with the rows, guarded by its version
    pub session_update: Option<(TillSession, u64)>,
    /// Approval request riding the same write set; None version inserts
    pub approval_write: Option<(ApprovalRequest, Option<u64>)>,
    /// Member account to build a posting notice for
    pub member_account: Option<AccountId>,
}

impl PostingPlan {
    pub(crate) fn new(
        operation: OperationType,
        branch_id: core_kernel::BranchId,
        accounting_date: NaiveDate,
        reference: TransactionReference,
        entry: LedgerEntry,
    ) -> Self {
        let currency = entry.currency();
        Self {
            operation,
            branch_id,
            accounting_date,
            reference,
            entry,
            fee: Money::zero(currency),
            tax: Money::zero(currency),
            fee_on: None,
            teller_id: None,
            tills: Vec::new(),
            reset_balance: None,
            related_reference: None,
            narration: None,
            session_insert: None,
            session_update: None,
            approval_write: None,
            member_account: None,
        }
    }
}

enum AttemptOutcome {
    Committed(PostingReceipt),
    Contention,
}

/// Executes business operations as atomic posting units
pub struct PostingOrchestrator {
    store: Arc<MemoryStore>,
    calendar: AccountingCalendar,
    tellers: TellerRegistry,
    charges: ChargeSchedule,
    branches: Arc<dyn BranchDirectory>,
    customers: Arc<dyn CustomerDirectory>,
    notifier: Arc<dyn Notifier>,
    max_attempts: u32,
    backoff: Duration,
    notify: bool,
}

impl PostingOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<MemoryStore>,
        calendar: AccountingCalendar,
        tellers: TellerRegistry,
        charges: ChargeSchedule,
        branches: Arc<dyn BranchDirectory>,
        customers: Arc<dyn CustomerDirectory>,
        notifier: Arc<dyn Notifier>,
        max_attempts: u32,
        backoff: Duration,
        notify: bool,
    ) -> Self {
        Self {
            store,
            calendar,
            tellers,
            charges,
            branches,
            customers,
            notifier,
            max_attempts: max_attempts.max(1),
            backoff,
            notify,
        }
    }

    // ------------------------------------------------------------------
    // Teller counter operations
    // ------------------------------------------------------------------

    /// Posts a cash deposit or cash withdrawal against a member account.
    ///
    /// None-cash operations are refused here; they enter through the
    /// approval workflow and settle when the checker approves.
    pub async fn post_member_operation(
        &self,
        ctx: &OperatorContext,
        request: MemberPostingRequest,
    ) -> Result<PostingReceipt, OperationError> {
        request
            .validate()
            .map_err(|e| OperationError::validation(e.to_string()))?;
        if !matches!(
            request.operation,
            OperationType::CashDeposit | OperationType::CashWithdrawal
        ) {
            return Err(OperationError::validation(format!(
                "{} does not post at the counter; submit it through the approval workflow",
                request.operation
            )));
        }
        if !request.amount.is_positive() {
            return Err(OperationError::validation(
                "Amount must be strictly positive",
            ));
        }

        let day = self.calendar.current_day(ctx.branch_id)?;
        let (teller, _) = self.tellers.resolve_for_user(ctx.user_id, day.date)?;
        teller.may_perform(request.operation)?;
        self.ensure_open_till(teller.id, day.date)?;

        let account = self.store.account(request.account_id)?.record;
        let inter_branch = account.branch_id != ctx.branch_id;
        let branch = self.branches.branch(ctx.branch_id).await?;

        let till_account = self.till_account(teller.id)?;
        let settlement = self.gl_account(ctx.branch_id, GlKind::CashSettlement)?;
        let vault = self.gl_account(ctx.branch_id, GlKind::BranchVault)?;

        let charges = self.charges.charges_for(request.operation, &request.amount);
        let currency = request.amount.currency();

        let mut entry = match request.operation {
            OperationType::CashDeposit => LedgerEntry::new(currency)
                .pair(settlement, account.id, request.amount, LegRole::Principal)
                .pair(vault, till_account, request.amount, LegRole::Custody),
            _ => LedgerEntry::new(currency)
                .pair(account.id, settlement, request.amount, LegRole::Principal)
                .pair(till_account, vault, request.amount, LegRole::Custody),
        };
        if charges.fee.is_positive() {
            let fee_income = self.gl_account(ctx.branch_id, GlKind::FeeIncome)?;
            entry = entry.pair(account.id, fee_income, charges.fee, LegRole::Fee);
        }
        if charges.tax.is_positive() {
            let vat_payable = self.gl_account(ctx.branch_id, GlKind::VatPayable)?;
            entry = entry.pair(account.id, vat_payable, charges.tax, LegRole::Vat);
        }

        let key = ReferenceKey::new(&branch.code, request.operation, day.date, inter_branch);
        let reference = self.store.reserve_reference(&key);

        let mut plan = PostingPlan::new(
            request.operation,
            ctx.branch_id,
            day.date,
            reference,
            entry,
        );
        plan.fee = charges.fee;
        plan.tax = charges.tax;
        plan.fee_on = Some(account.id);
        plan.teller_id = Some(teller.id);
        plan.tills = vec![(teller.id, till_account)];
        plan.narration = request.narration;
        plan.member_account = Some(account.id);

        self.execute(ctx, plan).await
    }

    /// Funds a remittance with walk-in cash and raises the payout request.
    ///
    /// The cash received covers principal plus charges. The payout side is
    /// staged as a pending approval request in the same write set, so a
    /// funded remittance always has its payout awaiting the workflow.
    pub async fn fund_remittance(
        &self,
        ctx: &OperatorContext,
        request: RemittanceFundingRequest,
    ) -> Result<(PostingReceipt, ApprovalRequest), OperationError> {
        request
            .validate()
            .map_err(|e| OperationError::validation(e.to_string()))?;
        if !request.amount.is_positive() {
            return Err(OperationError::validation(
                "Amount must be strictly positive",
            ));
        }

        let day = self.calendar.current_day(ctx.branch_id)?;
        let (teller, _) = self.tellers.resolve_for_user(ctx.user_id, day.date)?;
        teller.may_perform(OperationType::RemittanceFunding)?;
        self.ensure_open_till(teller.id, day.date)?;

        let branch = self.branches.branch(ctx.branch_id).await?;
        let till_account = self.till_account(teller.id)?;
        let settlement = self.gl_account(ctx.branch_id, GlKind::CashSettlement)?;
        let vault = self.gl_account(ctx.branch_id, GlKind::BranchVault)?;
        let payable = self.gl_account(ctx.branch_id, GlKind::RemittancePayable)?;

        let charges = self
            .charges
            .charges_for(OperationType::RemittanceFunding, &request.amount);
        let cash_in = request
            .amount
            .checked_add(&charges.fee)?
            .checked_add(&charges.tax)?;

        let mut entry = LedgerEntry::new(request.amount.currency())
            .pair(settlement, payable, request.amount, LegRole::Principal)
            .pair(vault, till_account, cash_in, LegRole::Custody);
        if charges.fee.is_positive() {
            let fee_income = self.gl_account(ctx.branch_id, GlKind::FeeIncome)?;
            entry = entry.pair(settlement, fee_income, charges.fee, LegRole::Fee);
        }
        if charges.tax.is_positive() {
            let vat_payable = self.gl_account(ctx.branch_id, GlKind::VatPayable)?;
            entry = entry.pair(settlement, vat_payable, charges.tax, LegRole::Vat);
        }

        let key = ReferenceKey::new(
            &branch.code,
            OperationType::RemittanceFunding,
            day.date,
            false,
        );
        let reference = self.store.reserve_reference(&key);

        let payout_request = ApprovalRequest::submit(
            ctx.branch_id,
            ApprovalPayload::RemittancePayout {
                funding_reference: reference.clone(),
                beneficiary: request.beneficiary,
                amount: request.amount,
            },
            ctx.user_id,
            request.narration.clone(),
        );

        let mut plan = PostingPlan::new(
            OperationType::RemittanceFunding,
            ctx.branch_id,
            day.date,
            reference,
            entry,
        );
        plan.fee = charges.fee;
        plan.tax = charges.tax;
        plan.fee_on = Some(settlement);
        plan.teller_id = Some(teller.id);
        plan.tills = vec![(teller.id, till_account)];
        plan.narration = request.narration;
        plan.approval_write = Some((payout_request.clone(), None));

        let receipt = self.execute(ctx, plan).await?;
        Ok((receipt, payout_request))
    }

    // ------------------------------------------------------------------
    // Approval settlements
    // ------------------------------------------------------------------

    /// Settles a none-cash request at the approve step.
    ///
    /// The request must already carry the approval stamps; it is written
    /// with the rows so the approval and its posting land together.
    pub(crate) async fn settle_none_cash(
        &self,
        ctx: &OperatorContext,
        mut request: ApprovalRequest,
        expected_version: u64,
    ) -> Result<PostingReceipt, OperationError> {
        let (account_id, direction, amount, narration) = match &request.payload {
            ApprovalPayload::NoneCash {
                account_id,
                direction,
                amount,
                narration,
            } => (*account_id, *direction, *amount, narration.clone()),
            other => {
                return Err(OperationError::internal(format!(
                    "settle_none_cash called with a {} payload",
                    other.label()
                )))
            }
        };

        let operation = request.payload.operation_type();
        let day = self.calendar.current_day(ctx.branch_id)?;
        let account = self.store.account(account_id)?.record;
        let inter_branch = account.branch_id != ctx.branch_id;
        let branch = self.branches.branch(ctx.branch_id).await?;
        let settlement = self.gl_account(ctx.branch_id, GlKind::CashSettlement)?;

        let entry = match direction {
            PostingDirection::Debit => LedgerEntry::new(amount.currency()).pair(
                account_id,
                settlement,
                amount,
                LegRole::Principal,
            ),
            PostingDirection::Credit => LedgerEntry::new(amount.currency()).pair(
                settlement,
                account_id,
                amount,
                LegRole::Principal,
            ),
        };

        let key = ReferenceKey::new(&branch.code, operation, day.date, inter_branch);
        let reference = self.store.reserve_reference(&key);
        request.mark_posted(reference.clone())?;

        let mut plan = PostingPlan::new(operation, ctx.branch_id, day.date, reference, entry);
        plan.narration = narration;
        plan.approval_write = Some((request, Some(expected_version)));
        plan.member_account = Some(account_id);

        self.execute(ctx, plan).await
    }

    /// Settles a reversal or remittance payout at the treat step.
    ///
    /// Both hand cash over the counter, so the treating user must hold a
    /// teller with an open till; reversal custody legs are redirected
    /// through that drawer.
    pub(crate) async fn settle_on_treat(
        &self,
        ctx: &OperatorContext,
        mut request: ApprovalRequest,
        expected_version: u64,
    ) -> Result<PostingReceipt, OperationError> {
        let operation = request.payload.operation_type();
        let day = self.calendar.current_day(ctx.branch_id)?;
        let (teller, _) = self.tellers.resolve_for_user(ctx.user_id, day.date)?;
        teller.may_perform(operation)?;
        let branch = self.branches.branch(ctx.branch_id).await?;

        let (entry, related, tills, narration) = match &request.payload {
            ApprovalPayload::Reversal {
                original_reference, ..
            } => {
                let originals = self
                    .store
                    .transactions_by_reference(original_reference)?;
                if originals.is_empty() {
                    return Err(OperationError::not_found(format!(
                        "No posted legs under reference {original_reference}"
                    )));
                }
                self.ensure_not_reversed(original_reference, &originals)?;

                let currency = originals[0].amount.currency();
                let mut redirected = originals.clone();
                let mut tills = Vec::new();
                let needs_till = redirected.iter().any(|row| row.role == LegRole::Custody);
                if needs_till {
                    self.ensure_open_till(teller.id, day.date)?;
                    let till_account = self.till_account(teller.id)?;
                    for row in &mut redirected {
                        let holder = self.store.account(row.account_id)?.record.holder;
                        if matches!(holder, AccountHolder::Teller(_)) {
                            row.account_id = till_account;
                        }
                    }
                    tills.push((teller.id, till_account));
                }
                (
                    LedgerEntry::mirror(currency, &redirected),
                    Some(original_reference.clone()),
                    tills,
                    None,
                )
            }
            ApprovalPayload::RemittancePayout {
                funding_reference,
                amount,
                ..
            } => {
                self.ensure_open_till(teller.id, day.date)?;
                let till_account = self.till_account(teller.id)?;
                let settlement = self.gl_account(ctx.branch_id, GlKind::CashSettlement)?;
                let vault = self.gl_account(ctx.branch_id, GlKind::BranchVault)?;
                let payable = self.gl_account(ctx.branch_id, GlKind::RemittancePayable)?;
                let entry = LedgerEntry::new(amount.currency())
                    .pair(payable, settlement, *amount, LegRole::Principal)
                    .pair(till_account, vault, *amount, LegRole::Custody);
                (
                    entry,
                    Some(funding_reference.clone()),
                    vec![(teller.id, till_account)],
                    None,
                )
            }
            ApprovalPayload::NoneCash { .. } => {
                return Err(OperationError::internal(
                    "settle_on_treat called with a none_cash payload",
                ))
            }
        };

        let key = ReferenceKey::new(&branch.code, operation, day.date, false);
        let reference = self.store.reserve_reference(&key);
        request.mark_posted(reference.clone())?;

        let mut plan = PostingPlan::new(operation, ctx.branch_id, day.date, reference, entry);
        plan.teller_id = Some(teller.id);
        plan.tills = tills;
        plan.related_reference = related;
        plan.narration = narration;
        plan.approval_write = Some((request, Some(expected_version)));

        self.execute(ctx, plan).await
    }

    // ------------------------------------------------------------------
    // Shared execution engine
    // ------------------------------------------------------------------

    /// Runs a plan to completion: balance mutations, rows, session and
    /// approval writes, and the reference commit, all in one store apply.
    /// Any failure after the reservation reverts the reference.
    pub(crate) async fn execute(
        &self,
        ctx: &OperatorContext,
        plan: PostingPlan,
    ) -> Result<PostingReceipt, OperationError> {
        match self.run(ctx, &plan).await {
            Ok(receipt) => {
                info!(
                    correlation_id = %ctx.correlation_id,
                    reference = %receipt.reference,
                    operation = %receipt.operation,
                    amount = %receipt.amount,
                    "operation posted"
                );
                self.send_notice(ctx, &plan, &receipt).await;
                Ok(receipt)
            }
            Err(err) => {
                if let Err(revert_err) = self.store.revert_reference(&plan.reference) {
                    warn!(
                        correlation_id = %ctx.correlation_id,
                        reference = %plan.reference,
                        error = %revert_err,
                        "reference revert failed"
                    );
                }
                warn!(
                    correlation_id = %ctx.correlation_id,
                    reference = %plan.reference,
                    operation = %plan.operation,
                    error = %err,
                    "posting failed and was reverted"
                );
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        ctx: &OperatorContext,
        plan: &PostingPlan,
    ) -> Result<PostingReceipt, OperationError> {
        plan.entry.validate()?;

        let mut attempt = 1;
        loop {
            match self.attempt(plan)? {
                AttemptOutcome::Committed(receipt) => return Ok(receipt),
                AttemptOutcome::Contention => {
                    if attempt >= self.max_attempts {
                        return Err(OperationError::conflict(format!(
                            "Gave up after {} attempts on contended accounts",
                            attempt
                        )));
                    }
                    debug!(
                        correlation_id = %ctx.correlation_id,
                        reference = %plan.reference,
                        attempt,
                        "version race lost, retrying"
                    );
                    sleep(self.backoff * attempt).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One read-mutate-stage-apply cycle
    fn attempt(&self, plan: &PostingPlan) -> Result<AttemptOutcome, OperationError> {
        let mut account_ids: Vec<AccountId> = Vec::new();
        for leg in plan.entry.legs() {
            if !account_ids.contains(&leg.account_id) {
                account_ids.push(leg.account_id);
            }
        }

        let mut snapshots = HashMap::new();
        for id in &account_ids {
            let versioned = self.store.account(*id)?;
            snapshots.insert(*id, (versioned.record, versioned.version));
        }

        let now = Utc::now();
        let mut rows = Vec::with_capacity(plan.entry.legs().len());
        for leg in plan.entry.legs() {
            let (account, _) = snapshots
                .get_mut(&leg.account_id)
                .ok_or_else(|| OperationError::internal("planned leg lost its snapshot"))?;

            let is_reset = matches!(
                plan.reset_balance,
                Some((reset_id, _)) if reset_id == leg.account_id
                    && leg.direction == PostingDirection::Credit
            );
            rows.push(self.apply_leg(plan, leg, account, is_reset, now)?);
        }

        let mut teller_ops = Vec::new();
        for (teller_id, till_account) in &plan.tills {
            for row in rows.iter().filter(|r| r.account_id == *till_account) {
                teller_ops.push(TellerOperationRecord {
                    id: TellerOperationId::new_v7(),
                    teller_id: *teller_id,
                    branch_id: plan.branch_id,
                    operation_type: plan.operation,
                    reference: plan.reference.clone(),
                    direction: row.direction,
                    amount: row.amount,
                    previous_balance: row.previous_balance,
                    new_balance: row.new_balance,
                    accounting_date: plan.accounting_date,
                    created_at: now,
                });
            }
        }

        let mut set = WriteSet::new();
        for (account, version) in snapshots.into_values() {
            set.update_account(account, version);
        }
        for row in &rows {
            set.append_transaction(row.clone());
        }
        for op in teller_ops {
            set.append_teller_operation(op);
        }
        if let Some(session) = &plan.session_insert {
            set.insert_session(session.clone());
        }
        if let Some((session, version)) = &plan.session_update {
            set.update_session(session.clone(), *version);
        }
        match &plan.approval_write {
            Some((request, None)) => {
                set.insert_approval(request.clone());
            }
            Some((request, Some(version))) => {
                set.update_approval(request.clone(), *version);
            }
            None => {}
        }
        set.commit_reference(plan.reference.clone());

        match self.store.apply(set) {
            Ok(()) => {
                // The member's last leg carries the final balance; fee and
                // tax legs land after the principal leg.
                let new_balance = plan.member_account.and_then(|id| {
                    rows.iter()
                        .rev()
                        .find(|r| r.account_id == id)
                        .map(|r| r.new_balance)
                });
                // Custody-only operations (till provisioning) report the
                // moved amount instead of a principal amount.
                let amount = plan
                    .entry
                    .legs()
                    .iter()
                    .find(|l| l.role == LegRole::Principal)
                    .or_else(|| plan.entry.legs().first())
                    .map(|l| l.amount)
                    .unwrap_or_else(|| Money::zero(plan.entry.currency()));
                Ok(AttemptOutcome::Committed(PostingReceipt {
                    reference: plan.reference.clone(),
                    operation: plan.operation,
                    amount,
                    fee: plan.fee,
                    tax: plan.tax,
                    accounting_date: plan.accounting_date,
                    new_balance,
                    legs: rows,
                }))
            }
            Err(err) if err.is_retryable() => Ok(AttemptOutcome::Contention),
            Err(err) => Err(err.into()),
        }
    }

    fn apply_leg(
        &self,
        plan: &PostingPlan,
        leg: &domain_ledger::PlannedLeg,
        account: &mut domain_ledger::Account,
        is_reset: bool,
        now: chrono::DateTime<Utc>,
    ) -> Result<TransactionRecord, OperationError> {
        if is_reset {
            let to = plan
                .reset_balance
                .map(|(_, to)| to)
                .ok_or_else(|| OperationError::internal("reset leg without a reset target"))?;
            account.set_balance(to)?;
        } else {
            match leg.direction {
                PostingDirection::Debit => account.debit(&leg.amount)?,
                PostingDirection::Credit => account.credit(&leg.amount)?,
            }
        }

        let carries_charges =
            plan.fee_on == Some(leg.account_id) && leg.role == LegRole::Principal;
        let currency = leg.amount.currency();
        Ok(TransactionRecord {
            id: TransactionId::new_v7(),
            reference: plan.reference.clone(),
            account_id: leg.account_id,
            branch_id: plan.branch_id,
            direction: leg.direction,
            amount: leg.amount,
            previous_balance: account.previous_balance,
            new_balance: account.balance,
            fee: if carries_charges {
                plan.fee
            } else {
                Money::zero(currency)
            },
            tax: if carries_charges {
                plan.tax
            } else {
                Money::zero(currency)
            },
            operation_type: plan.operation,
            role: leg.role,
            accounting_date: plan.accounting_date,
            teller_id: plan.teller_id,
            related_reference: plan.related_reference.clone(),
            narration: plan.narration.clone(),
            created_at: now,
        })
    }

    async fn send_notice(
        &self,
        ctx: &OperatorContext,
        plan: &PostingPlan,
        receipt: &PostingReceipt,
    ) {
        if !self.notify {
            debug!(reference = %receipt.reference, "posting notices disabled");
            return;
        }
        let Some(account_id) = plan.member_account else {
            return;
        };
        let Some(row) = receipt
            .legs
            .iter()
            .find(|r| r.account_id == account_id && r.role == LegRole::Principal)
        else {
            return;
        };
        let member = match self.customers.member_for_account(account_id).await {
            Ok(member) => member,
            Err(err) => {
                warn!(
                    correlation_id = %ctx.correlation_id,
                    reference = %receipt.reference,
                    error = %err,
                    "member lookup for notice failed"
                );
                return;
            }
        };
        let notice = PostingNotice {
            reference: receipt.reference.clone(),
            account_id,
            operation_type: receipt.operation,
            direction: row.direction,
            amount: row.amount,
            new_balance: receipt.new_balance.unwrap_or(row.new_balance),
        };
        if let Err(err) = self.notifier.notify_posting(&member, &notice).await {
            warn!(
                correlation_id = %ctx.correlation_id,
                reference = %receipt.reference,
                error = %err,
                "posting notice failed"
            );
        }
    }

    // ------------------------------------------------------------------
    // Resolution helpers
    // ------------------------------------------------------------------

    fn ensure_open_till(&self, teller_id: TellerId, date: NaiveDate) -> Result<(), OperationError> {
        match self.store.till_session_for(teller_id, date)? {
            Some(session) if session.record.is_open() => Ok(()),
            Some(_) => Err(TellerError::TillClosed {
                teller: teller_id.to_string(),
                date,
            }
            .into()),
            None => Err(TellerError::TillNotOpen {
                teller: teller_id.to_string(),
                date,
            }
            .into()),
        }
    }

    pub(crate) fn ensure_not_reversed(
        &self,
        original: &TransactionReference,
        originals: &[TransactionRecord],
    ) -> Result<(), OperationError> {
        for row in originals {
            let compensating = self.store.transactions_for_account(row.account_id)?;
            if compensating
                .iter()
                .any(|r| r.related_reference.as_ref() == Some(original))
            {
                return Err(OperationError::conflict(format!(
                    "Reference {original} was already reversed"
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn till_account(&self, teller_id: TellerId) -> Result<AccountId, OperationError> {
        self.store.till_account_id(teller_id).map_err(|_| {
            OperationError::validation(format!(
                "Teller {teller_id} has no till account configured"
            ))
        })
    }

    pub(crate) fn gl_account(
        &self,
        branch_id: core_kernel::BranchId,
        kind: GlKind,
    ) -> Result<AccountId, OperationError> {
        self.store.gl_account_id(branch_id, kind).map_err(|_| {
            OperationError::validation(format!(
                "Branch {branch_id} has no {kind} account configured"
            ))
        })
    }

    pub(crate) fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    pub(crate) fn calendar(&self) -> &AccountingCalendar {
        &self.calendar
    }

    pub(crate) fn tellers(&self) -> &TellerRegistry {
        &self.tellers
    }

    pub(crate) fn branches(&self) -> &Arc<dyn BranchDirectory> {
        &self.branches
    }
}
