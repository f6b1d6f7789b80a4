//! Till lifecycle service
//!
//! Opening provisions a drawer with counted cash, replenishment tops a sub
//! till up from the primary till, and closing records the declared count
//! against the drawer balance. Opening and replenishment post through the
//! orchestrator; closing touches no balances and issues no reference.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use core_kernel::{LegRole, Money, OperationError, OperationType, ReferenceKey, TellerId};
use domain_ledger::{GlKind, LedgerEntry};
use domain_teller::{CashBreakdown, TellerError, TellerKind, TillSession};
use infra_store::{Versioned, WriteSet};

use crate::context::OperatorContext;
use crate::posting::{PostingOrchestrator, PostingPlan, PostingReceipt};

/// Opens a drawer for the day
#[derive(Debug, Clone)]
pub struct TillOpenRequest {
    /// Teller whose drawer is provisioned
    pub teller_id: TellerId,
    /// Declared opening amount
    pub amount: Money,
    /// Counted notes and coins backing the declaration
    pub denominations: CashBreakdown,
}

/// Tops a sub till up from the primary till
#[derive(Debug, Clone)]
pub struct TillReplenishRequest {
    /// Receiving sub teller
    pub teller_id: TellerId,
    /// Amount moved from the primary drawer
    pub amount: Money,
    /// Counted notes and coins backing the declaration
    pub denominations: CashBreakdown,
}

/// Closes a drawer for the day
#[derive(Debug, Clone)]
pub struct TillCloseRequest {
    /// Teller whose drawer is closed
    pub teller_id: TellerId,
    /// Physically counted cash at hand
    pub cash_at_hand: Money,
    /// Counted notes and coins backing the declaration
    pub denominations: CashBreakdown,
    /// Closing remark
    pub narration: Option<String>,
}

/// Outcome of a till close
#[derive(Debug, Clone)]
pub struct TillCloseSummary {
    /// The closed session
    pub session: TillSession,
    /// Drawer balance per the ledger at close time
    pub drawer_balance: Money,
    /// Declared cash minus drawer balance; positive is an overage,
    /// negative a shortage
    pub variance: Money,
}

/// Till open, replenish and close
pub struct TillService {
    posting: Arc<PostingOrchestrator>,
}

impl TillService {
    pub fn new(posting: Arc<PostingOrchestrator>) -> Self {
        Self { posting }
    }

    /// Opens the teller's till for the current accounting day.
    ///
    /// The acting user must hold the teller today. A primary till draws its
    /// float from the branch vault; a sub till draws from the primary till,
    /// which must already be open. The receiving drawer balance is set to
    /// the opening amount outright, so cash left in a drawer overnight does
    /// not stack onto the new float.
    pub async fn open_till(
        &self,
        ctx: &OperatorContext,
        request: TillOpenRequest,
    ) -> Result<PostingReceipt, OperationError> {
        let day = self.posting.calendar().current_day(ctx.branch_id)?;
        let teller = self
            .posting
            .tellers()
            .ensure_holder(ctx.user_id, request.teller_id, day.date)?;
        teller.may_perform(OperationType::TillOpening)?;

        match self.posting.store().till_session_for(teller.id, day.date)? {
            Some(existing) if existing.record.is_open() => {
                return Err(TellerError::TillAlreadyOpen {
                    teller: teller.id.to_string(),
                    date: day.date,
                }
                .into())
            }
            Some(_) => {
                return Err(TellerError::TillClosed {
                    teller: teller.id.to_string(),
                    date: day.date,
                }
                .into())
            }
            None => {}
        }

        // Count the drawer before touching the sequencer, so a bad
        // declaration leaves no reserved slot behind.
        request.denominations.verify_against(&request.amount)?;

        let till_account = self.posting.till_account(teller.id)?;
        let mut tills = vec![(teller.id, till_account)];
        let source = match teller.kind {
            TellerKind::Primary => self
                .posting
                .gl_account(ctx.branch_id, GlKind::BranchVault)?,
            TellerKind::Sub => {
                let primary = self.posting.tellers().primary_teller(ctx.branch_id)?;
                if self
                    .posting
                    .store()
                    .open_till_session(primary.id, day.date)?
                    .is_none()
                {
                    return Err(TellerError::PrimaryTillNotOpen {
                        branch: ctx.branch_id.to_string(),
                        date: day.date,
                    }
                    .into());
                }
                let primary_account = self.posting.till_account(primary.id)?;
                tills.push((primary.id, primary_account));
                primary_account
            }
            TellerKind::NoneCash => {
                // Already refused by may_perform above
                return Err(TellerError::RightsViolation {
                    teller: teller.id.to_string(),
                    operation: OperationType::TillOpening,
                }
                .into());
            }
        };

        let branch = self.posting.branches().branch(ctx.branch_id).await?;
        let key = ReferenceKey::new(&branch.code, OperationType::TillOpening, day.date, false);
        let reference = self.posting.store().reserve_reference(&key);

        let session = TillSession::open(
            &teller,
            day.date,
            request.amount,
            request.denominations,
            reference.clone(),
            ctx.user_id,
        )?;

        let entry = LedgerEntry::new(request.amount.currency()).pair(
            source,
            till_account,
            request.amount,
            LegRole::Custody,
        );
        let mut plan = PostingPlan::new(
            OperationType::TillOpening,
            ctx.branch_id,
            day.date,
            reference,
            entry,
        );
        plan.teller_id = Some(teller.id);
        plan.tills = tills;
        plan.reset_balance = Some((till_account, request.amount));
        plan.session_insert = Some(session);

        self.posting.execute(ctx, plan).await
    }

    /// Tops the teller's sub till up from the primary till.
    ///
    /// Both drawers must be open. The primary drawer must actually hold the
    /// amount; its zero floor rejects the posting otherwise.
    pub async fn replenish_till(
        &self,
        ctx: &OperatorContext,
        request: TillReplenishRequest,
    ) -> Result<PostingReceipt, OperationError> {
        let day = self.posting.calendar().current_day(ctx.branch_id)?;
        let teller = self
            .posting
            .tellers()
            .ensure_holder(ctx.user_id, request.teller_id, day.date)?;
        teller.may_perform(OperationType::TillReplenishment)?;
        if teller.kind != TellerKind::Sub {
            return Err(OperationError::validation(
                "Only sub tills replenish from the primary till; the primary draws its float at day open",
            ));
        }

        let session = self.open_session(teller.id, day.date)?;
        let primary = self.posting.tellers().primary_teller(ctx.branch_id)?;
        if self
            .posting
            .store()
            .open_till_session(primary.id, day.date)?
            .is_none()
        {
            return Err(TellerError::PrimaryTillNotOpen {
                branch: ctx.branch_id.to_string(),
                date: day.date,
            }
            .into());
        }

        let mut updated = session.record.clone();
        updated.record_replenishment(request.amount, &request.denominations)?;

        let till_account = self.posting.till_account(teller.id)?;
        let primary_account = self.posting.till_account(primary.id)?;

        let branch = self.posting.branches().branch(ctx.branch_id).await?;
        let key = ReferenceKey::new(
            &branch.code,
            OperationType::TillReplenishment,
            day.date,
            false,
        );
        let reference = self.posting.store().reserve_reference(&key);

        let entry = LedgerEntry::new(request.amount.currency()).pair(
            primary_account,
            till_account,
            request.amount,
            LegRole::Custody,
        );
        let mut plan = PostingPlan::new(
            OperationType::TillReplenishment,
            ctx.branch_id,
            day.date,
            reference,
            entry,
        );
        plan.teller_id = Some(teller.id);
        plan.tills = vec![(teller.id, till_account), (primary.id, primary_account)];
        plan.session_update = Some((updated, session.version));

        self.posting.execute(ctx, plan).await
    }

    /// Closes the teller's till for the day.
    ///
    /// Records the declared count and reports the variance against the
    /// drawer balance. No balances move and no reference is issued; the
    /// drawer's cash stays on the till account until the next day open
    /// resets it.
    pub fn close_till(
        &self,
        ctx: &OperatorContext,
        request: TillCloseRequest,
    ) -> Result<TillCloseSummary, OperationError> {
        let day = self.posting.calendar().current_day(ctx.branch_id)?;
        let teller = self
            .posting
            .tellers()
            .ensure_holder(ctx.user_id, request.teller_id, day.date)?;

        let session = self.open_session(teller.id, day.date)?;

        let mut updated = session.record.clone();
        updated.close(
            request.cash_at_hand,
            request.denominations,
            ctx.user_id,
            request.narration,
        )?;

        let till_account = self.posting.till_account(teller.id)?;
        let drawer_balance = self.posting.store().account(till_account)?.record.balance;
        let variance = request.cash_at_hand.checked_sub(&drawer_balance)?;

        let mut set = WriteSet::new();
        set.update_session(updated.clone(), session.version);
        self.posting.store().apply(set)?;

        info!(
            correlation_id = %ctx.correlation_id,
            teller = %teller.id,
            date = %day.date,
            declared = %request.cash_at_hand,
            drawer = %drawer_balance,
            variance = %variance,
            "till closed"
        );

        Ok(TillCloseSummary {
            session: updated,
            drawer_balance,
            variance,
        })
    }

    fn open_session(
        &self,
        teller_id: TellerId,
        date: NaiveDate,
    ) -> Result<Versioned<TillSession>, OperationError> {
        match self.posting.store().till_session_for(teller_id, date)? {
            Some(v) if v.record.is_open() => Ok(v),
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
}

