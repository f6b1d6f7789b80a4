//! Application Services Tests
//!
//! This module contains comprehensive tests for the orchestration layer:
//! - `TillService` - drawer lifecycle from day open to close
//! - `PostingOrchestrator` - counter postings and remittance funding
//! - `ApprovalService` - maker-checker workflow and deferred settlement
//!
//! # Test Coverage
//!
//! ## Till Lifecycle Tests
//! - Primary and sub till provisioning, including the vault and
//!   primary-drawer custody movements
//! - Replenishment bookkeeping and drawer floors
//! - Close variance reporting and the terminal closed state
//!
//! ## Cash Posting Tests
//! - Deposit and withdrawal recipes with fee and VAT pricing
//! - Reference issuance, including the inter-branch flag and burned
//!   numbers on failed postings
//! - Teller gating: rights, daily assignment and open drawers
//!
//! ## Approval Workflow Tests
//! - Settlement timing per payload (on approve vs on treat)
//! - Reversal custody redirection through the treating drawer
//! - Maker-checker separation and terminal reversals
//!
//! ## Remittance Tests
//! - Funding cash-in with charges and the staged payout request
//! - Payout settlement from the treating drawer
//!
//! # Test Organization
//!
//! - `till_lifecycle` - open, replenish and close
//! - `cash_postings` - counter deposits and withdrawals
//! - `approval_workflow` - none-cash movements and reversals
//! - `remittances` - funding and payout

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use app_services::{
    ApprovalOutcome, BranchInfo, CoreConfig, CoreEngine, MemberInfo, MemberPostingRequest,
    OperatorContext, RecordingNotifier, RemittanceFundingRequest, StaticBranchDirectory,
    StaticCustomerDirectory, TillCloseRequest, TillOpenRequest, TillReplenishRequest,
};
use core_kernel::{
    AccountId, AccountingDay, BranchId, Currency, ErrorKind, LegRole, MemberId, Money,
    OperationType, PostingDirection, ReferenceKey, ReservationStatus, TransactionReference,
    UserId,
};
use domain_approval::{ApprovalPayload, ApprovalStatus};
use domain_ledger::{Account, GlKind};
use domain_teller::{CashBreakdown, DenominationKind, Teller, TellerKind};
use infra_store::MemoryStore;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
}

fn next_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
}

fn tzs(amount: Decimal) -> Money {
    Money::new(amount, Currency::TZS)
}

/// A drawer count made of 10,000 TZS notes
fn notes(count: u32) -> CashBreakdown {
    let mut breakdown = CashBreakdown::new(Currency::TZS);
    breakdown.add(DenominationKind::Note, dec!(10000), count);
    breakdown
}

/// One branch with its ledger scaffolding, three tellers and their users
struct World {
    engine: CoreEngine,
    branch: BranchId,
    primary: Teller,
    counter: Teller,
    back_office: Teller,
    primary_user: UserId,
    counter_user: UserId,
    back_office_user: UserId,
    supervisor: UserId,
    notifier: Arc<RecordingNotifier>,
    customers: Arc<StaticCustomerDirectory>,
}

/// Seeds a branch on its 2025-03-14 accounting day: the five GL accounts,
/// a primary till, a sub till ("Counter 1") and a none-cash teller, each
/// held by its own user.
fn world() -> World {
    let store = Arc::new(MemoryStore::new());
    let branch = BranchId::new();
    store
        .set_accounting_day(AccountingDay::open(branch, date()))
        .unwrap();

    for kind in [
        GlKind::BranchVault,
        GlKind::CashSettlement,
        GlKind::FeeIncome,
        GlKind::VatPayable,
        GlKind::RemittancePayable,
    ] {
        let account = Account::general_ledger(kind, branch, Currency::TZS);
        let id = account.id;
        store.seed_account(account).unwrap();
        store.bind_gl_account(branch, kind, id).unwrap();
    }

    let primary = Teller::new(branch, "Main Till", TellerKind::Primary);
    let counter = Teller::new(branch, "Counter 1", TellerKind::Sub);
    let back_office = Teller::new(branch, "Back Office", TellerKind::NoneCash);
    for teller in [&primary, &counter] {
        let till = Account::till(teller.id, branch, Currency::TZS);
        let till_id = till.id;
        store.seed_account(till).unwrap();
        store.bind_till_account(teller.id, till_id).unwrap();
    }
    store.seed_teller(primary.clone()).unwrap();
    store.seed_teller(counter.clone()).unwrap();
    store.seed_teller(back_office.clone()).unwrap();

    let branches = Arc::new(StaticBranchDirectory::new().with_branch(BranchInfo {
        id: branch,
        code: "001".to_string(),
        name: "Head Office".to_string(),
    }));
    let customers = Arc::new(StaticCustomerDirectory::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let engine = CoreEngine::with_store(
        store,
        CoreConfig::default(),
        branches,
        customers.clone(),
        notifier.clone(),
    );

    let supervisor = UserId::new();
    let primary_user = UserId::new();
    let counter_user = UserId::new();
    let back_office_user = UserId::new();
    engine
        .tellers()
        .assign_daily(primary.id, primary_user, date(), supervisor)
        .unwrap();
    engine
        .tellers()
        .assign_daily(counter.id, counter_user, date(), supervisor)
        .unwrap();
    engine
        .tellers()
        .assign_daily(back_office.id, back_office_user, date(), supervisor)
        .unwrap();

    World {
        engine,
        branch,
        primary,
        counter,
        back_office,
        primary_user,
        counter_user,
        back_office_user,
        supervisor,
        notifier,
        customers,
    }
}

impl World {
    fn ctx(&self, user: UserId) -> OperatorContext {
        OperatorContext::new(user, self.branch)
    }

    /// Seeds a member account with an opening balance and registers the
    /// member in the customer directory for notices
    fn seed_member(&self, opening: Money) -> AccountId {
        let mut account = Account::member(MemberId::new(), self.branch, opening.currency());
        if opening.is_positive() {
            account.credit(&opening).unwrap();
        }
        let id = account.id;
        self.engine.store().seed_account(account).unwrap();
        self.customers.register(
            id,
            MemberInfo {
                id: MemberId::new(),
                name: "Asha Mrisho".to_string(),
                phone: Some("+255700000001".to_string()),
            },
        );
        id
    }

    fn balance(&self, account_id: AccountId) -> Money {
        self.engine.store().account(account_id).unwrap().record.balance
    }

    fn gl_balance(&self, kind: GlKind) -> Money {
        let id = self
            .engine
            .store()
            .gl_account_id(self.branch, kind)
            .unwrap();
        self.balance(id)
    }

    fn till_balance(&self, teller: &Teller) -> Money {
        let id = self.engine.store().till_account_id(teller.id).unwrap();
        self.balance(id)
    }

    /// Opens the primary till with `note_count` notes of 10,000 TZS
    async fn open_primary(&self, note_count: u32) {
        let amount = tzs(dec!(10000) * Decimal::from(note_count));
        self.engine
            .tills()
            .open_till(
                &self.ctx(self.primary_user),
                TillOpenRequest {
                    teller_id: self.primary.id,
                    amount,
                    denominations: notes(note_count),
                },
            )
            .await
            .unwrap();
    }

    /// Opens the sub till with `note_count` notes of 10,000 TZS
    async fn open_counter(&self, note_count: u32) {
        let amount = tzs(dec!(10000) * Decimal::from(note_count));
        self.engine
            .tills()
            .open_till(
                &self.ctx(self.counter_user),
                TillOpenRequest {
                    teller_id: self.counter.id,
                    amount,
                    denominations: notes(note_count),
                },
            )
            .await
            .unwrap();
    }

    async fn deposit(&self, account_id: AccountId, amount: Decimal) -> TransactionReference {
        self.engine
            .posting()
            .post_member_operation(
                &self.ctx(self.counter_user),
                MemberPostingRequest {
                    account_id,
                    operation: OperationType::CashDeposit,
                    amount: tzs(amount),
                    narration: None,
                },
            )
            .await
            .unwrap()
            .reference
    }
}

// ============================================================================
// TILL LIFECYCLE TESTS
// ============================================================================

mod till_lifecycle {
    use super::*;

    /// Verifies that a primary till draws its float from the branch vault
    #[tokio::test]
    async fn test_primary_till_opens_from_the_vault() {
        let w = world();
        let receipt = w
            .engine
            .tills()
            .open_till(
                &w.ctx(w.primary_user),
                TillOpenRequest {
                    teller_id: w.primary.id,
                    amount: tzs(dec!(500000)),
                    denominations: notes(50),
                },
            )
            .await
            .unwrap();

        assert_eq!(receipt.operation, OperationType::TillOpening);
        assert!(receipt.reference.to_string().starts_with("TO-001-20250314-"));
        assert_eq!(w.till_balance(&w.primary), tzs(dec!(500000)));
        assert_eq!(w.gl_balance(GlKind::BranchVault), tzs(dec!(-500000)));

        let session = w
            .engine
            .store()
            .till_session_for(w.primary.id, date())
            .unwrap()
            .unwrap();
        assert!(session.record.is_open());
        assert_eq!(session.record.opening_amount, tzs(dec!(500000)));
    }

    /// Verifies that opening on a new day sets the drawer to the fresh
    /// float instead of stacking it on yesterday's leftover cash
    #[tokio::test]
    async fn test_reopening_next_day_resets_the_drawer() {
        let w = world();
        w.open_primary(50).await;

        let member = w.seed_member(tzs(dec!(0)));
        w.engine
            .posting()
            .post_member_operation(
                &w.ctx(w.primary_user),
                MemberPostingRequest {
                    account_id: member,
                    operation: OperationType::CashDeposit,
                    amount: tzs(dec!(120000)),
                    narration: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(w.till_balance(&w.primary), tzs(dec!(620000)));

        w.engine
            .tills()
            .close_till(
                &w.ctx(w.primary_user),
                TillCloseRequest {
                    teller_id: w.primary.id,
                    cash_at_hand: tzs(dec!(620000)),
                    denominations: notes(62),
                    narration: None,
                },
            )
            .unwrap();

        w.engine.calendar().open_day(w.branch, next_date()).unwrap();
        w.engine
            .tellers()
            .assign_daily(w.primary.id, w.primary_user, next_date(), w.supervisor)
            .unwrap();
        w.engine
            .tills()
            .open_till(
                &w.ctx(w.primary_user),
                TillOpenRequest {
                    teller_id: w.primary.id,
                    amount: tzs(dec!(300000)),
                    denominations: notes(30),
                },
            )
            .await
            .unwrap();

        assert_eq!(w.till_balance(&w.primary), tzs(dec!(300000)));
    }

    /// Verifies that a sub till cannot open before the branch primary
    #[tokio::test]
    async fn test_sub_till_needs_the_primary_open_first() {
        let w = world();
        let err = w
            .engine
            .tills()
            .open_till(
                &w.ctx(w.counter_user),
                TillOpenRequest {
                    teller_id: w.counter.id,
                    amount: tzs(dec!(200000)),
                    denominations: notes(20),
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("Primary till"));
    }

    /// Verifies that a sub till's float moves out of the primary drawer
    #[tokio::test]
    async fn test_sub_till_draws_its_float_from_the_primary_drawer() {
        let w = world();
        w.open_primary(100).await;
        w.open_counter(40).await;

        assert_eq!(w.till_balance(&w.primary), tzs(dec!(600000)));
        assert_eq!(w.till_balance(&w.counter), tzs(dec!(400000)));
        assert_eq!(w.gl_balance(GlKind::BranchVault), tzs(dec!(-1000000)));

        let ops = w
            .engine
            .store()
            .teller_operations_for(w.counter.id)
            .unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].operation_type, OperationType::TillOpening);
        assert_eq!(ops[0].new_balance, tzs(dec!(400000)));
    }

    /// Verifies that a drawer opens at most once per accounting day
    #[tokio::test]
    async fn test_second_open_on_the_same_day_is_refused() {
        let w = world();
        w.open_primary(50).await;

        let err = w
            .engine
            .tills()
            .open_till(
                &w.ctx(w.primary_user),
                TillOpenRequest {
                    teller_id: w.primary.id,
                    amount: tzs(dec!(100000)),
                    denominations: notes(10),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("already open"));
    }

    /// Verifies that a miscounted float fails before a reference is drawn
    #[tokio::test]
    async fn test_miscounted_float_is_rejected_before_any_posting() {
        let w = world();
        let err = w
            .engine
            .tills()
            .open_till(
                &w.ctx(w.primary_user),
                TillOpenRequest {
                    teller_id: w.primary.id,
                    amount: tzs(dec!(500000)),
                    denominations: notes(45),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let key = ReferenceKey::new("001", OperationType::TillOpening, date(), false);
        assert_eq!(w.engine.store().references_issued(&key), 0);
    }

    /// Verifies replenishment moves cash between drawers and is tracked
    /// on the session
    #[tokio::test]
    async fn test_replenishment_moves_cash_between_drawers() {
        let w = world();
        w.open_primary(100).await;
        w.open_counter(20).await;

        w.engine
            .tills()
            .replenish_till(
                &w.ctx(w.counter_user),
                TillReplenishRequest {
                    teller_id: w.counter.id,
                    amount: tzs(dec!(300000)),
                    denominations: notes(30),
                },
            )
            .await
            .unwrap();

        assert_eq!(w.till_balance(&w.counter), tzs(dec!(500000)));
        assert_eq!(w.till_balance(&w.primary), tzs(dec!(500000)));

        let session = w
            .engine
            .store()
            .till_session_for(w.counter.id, date())
            .unwrap()
            .unwrap();
        assert_eq!(session.record.replenished_total, tzs(dec!(300000)));
        assert_eq!(session.record.replenishment_count, 1);
        assert_eq!(
            session.record.provisioned_total().unwrap(),
            tzs(dec!(500000))
        );
    }

    /// Verifies the primary till is funded at day open only
    #[tokio::test]
    async fn test_primary_till_cannot_be_replenished() {
        let w = world();
        w.open_primary(100).await;

        let err = w
            .engine
            .tills()
            .replenish_till(
                &w.ctx(w.primary_user),
                TillReplenishRequest {
                    teller_id: w.primary.id,
                    amount: tzs(dec!(100000)),
                    denominations: notes(10),
                },
            )
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("the primary draws its float at day open"));
    }

    /// Verifies the primary drawer floor blocks over-replenishment and
    /// that the failed posting burns its reference number
    #[tokio::test]
    async fn test_replenishing_beyond_the_primary_float_is_rejected() {
        let w = world();
        w.open_primary(30).await;
        w.open_counter(10).await;

        let err = w
            .engine
            .tills()
            .replenish_till(
                &w.ctx(w.counter_user),
                TillReplenishRequest {
                    teller_id: w.counter.id,
                    amount: tzs(dec!(250000)),
                    denominations: notes(25),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("Insufficient funds"));
        assert_eq!(w.till_balance(&w.counter), tzs(dec!(100000)));
        assert_eq!(w.till_balance(&w.primary), tzs(dec!(200000)));

        let key = ReferenceKey::new("001", OperationType::TillReplenishment, date(), false);
        assert_eq!(w.engine.store().references_issued(&key), 1);
        let burned = TransactionReference::from_code("TR-001-20250314-00001");
        assert_eq!(
            w.engine.store().reference_status(&burned),
            Some(ReservationStatus::Reverted)
        );
    }

    /// Verifies close reports the overage and leaves the till terminal
    #[tokio::test]
    async fn test_close_reports_the_overage_and_freezes_the_till() {
        let w = world();
        w.open_primary(100).await;
        w.open_counter(50).await;

        let mut counted = notes(50);
        counted.add(DenominationKind::Note, dec!(1000), 1);
        counted.add(DenominationKind::Coin, dec!(500), 1);
        let summary = w
            .engine
            .tills()
            .close_till(
                &w.ctx(w.counter_user),
                TillCloseRequest {
                    teller_id: w.counter.id,
                    cash_at_hand: tzs(dec!(501500)),
                    denominations: counted,
                    narration: Some("over by 1500, pending recount".to_string()),
                },
            )
            .unwrap();

        assert_eq!(summary.drawer_balance, tzs(dec!(500000)));
        assert_eq!(summary.variance, tzs(dec!(1500)));
        assert!(!summary.session.is_open());

        let member = w.seed_member(tzs(dec!(50000)));
        let err = w
            .engine
            .posting()
            .post_member_operation(
                &w.ctx(w.counter_user),
                MemberPostingRequest {
                    account_id: member,
                    operation: OperationType::CashDeposit,
                    amount: tzs(dec!(10000)),
                    narration: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    /// Verifies a short drawer closes with a negative variance
    #[tokio::test]
    async fn test_close_reports_a_shortage() {
        let w = world();
        w.open_primary(50).await;

        let mut counted = notes(49);
        counted.add(DenominationKind::Note, dec!(1000), 8);
        let summary = w
            .engine
            .tills()
            .close_till(
                &w.ctx(w.primary_user),
                TillCloseRequest {
                    teller_id: w.primary.id,
                    cash_at_hand: tzs(dec!(498000)),
                    denominations: counted,
                    narration: Some("short, two notes under investigation".to_string()),
                },
            )
            .unwrap();

        assert_eq!(summary.variance, tzs(dec!(-2000)));
        assert_eq!(summary.drawer_balance, tzs(dec!(500000)));
    }

    /// Verifies the drawer tracks its cash through the day and closed is
    /// terminal for the date; a second count is refused
    #[tokio::test]
    async fn test_a_closed_till_cannot_be_closed_again() {
        let w = world();
        w.open_primary(100).await;
        w.open_counter(10).await;

        let member = w.seed_member(tzs(dec!(100000)));
        w.engine
            .posting()
            .post_member_operation(
                &w.ctx(w.counter_user),
                MemberPostingRequest {
                    account_id: member,
                    operation: OperationType::CashWithdrawal,
                    amount: tzs(dec!(20000)),
                    narration: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(w.till_balance(&w.counter), tzs(dec!(80000)));

        let summary = w
            .engine
            .tills()
            .close_till(
                &w.ctx(w.counter_user),
                TillCloseRequest {
                    teller_id: w.counter.id,
                    cash_at_hand: tzs(dec!(80000)),
                    denominations: notes(8),
                    narration: None,
                },
            )
            .unwrap();
        assert!(summary.variance.is_zero());
        assert!(!summary.session.is_open());

        let err = w
            .engine
            .tills()
            .close_till(
                &w.ctx(w.counter_user),
                TillCloseRequest {
                    teller_id: w.counter.id,
                    cash_at_hand: tzs(dec!(80000)),
                    denominations: notes(8),
                    narration: Some("second count".to_string()),
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert!(err.to_string().contains("is closed on"));
    }
}

// ============================================================================
// CASH POSTING TESTS
// ============================================================================

mod cash_postings {
    use super::*;

    /// Verifies the deposit recipe: member credited, drawer grown, member
    /// notified with the running balance
    #[tokio::test]
    async fn test_deposit_credits_the_member_and_the_drawer() {
        let w = world();
        w.open_primary(100).await;
        w.open_counter(50).await;
        let member = w.seed_member(tzs(dec!(50000)));

        let receipt = w
            .engine
            .posting()
            .post_member_operation(
                &w.ctx(w.counter_user),
                MemberPostingRequest {
                    account_id: member,
                    operation: OperationType::CashDeposit,
                    amount: tzs(dec!(100000)),
                    narration: Some("salary".to_string()),
                },
            )
            .await
            .unwrap();

        assert!(receipt.reference.to_string().starts_with("CD-001-20250314-"));
        assert!(receipt.fee.is_zero());
        assert!(receipt.tax.is_zero());
        assert_eq!(receipt.new_balance, Some(tzs(dec!(150000))));
        assert_eq!(w.balance(member), tzs(dec!(150000)));
        assert_eq!(w.till_balance(&w.counter), tzs(dec!(600000)));
        assert_eq!(w.gl_balance(GlKind::CashSettlement), tzs(dec!(-100000)));

        let notices = w.notifier.sent();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].direction, PostingDirection::Credit);
        assert_eq!(notices[0].amount, tzs(dec!(100000)));
        assert_eq!(notices[0].new_balance, tzs(dec!(150000)));
    }

    /// Verifies withdrawal pricing: 0.5% fee plus 18% VAT on the fee
    #[tokio::test]
    async fn test_withdrawal_prices_fee_and_vat() {
        let w = world();
        w.open_primary(100).await;
        w.open_counter(50).await;
        let member = w.seed_member(tzs(dec!(200000)));

        let receipt = w
            .engine
            .posting()
            .post_member_operation(
                &w.ctx(w.counter_user),
                MemberPostingRequest {
                    account_id: member,
                    operation: OperationType::CashWithdrawal,
                    amount: tzs(dec!(100000)),
                    narration: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(receipt.fee, tzs(dec!(500)));
        assert_eq!(receipt.tax, tzs(dec!(90)));
        assert_eq!(receipt.new_balance, Some(tzs(dec!(99410))));
        assert_eq!(w.balance(member), tzs(dec!(99410)));
        assert_eq!(w.till_balance(&w.counter), tzs(dec!(400000)));
        assert_eq!(w.gl_balance(GlKind::FeeIncome), tzs(dec!(500)));
        assert_eq!(w.gl_balance(GlKind::VatPayable), tzs(dec!(90)));

        // charge figures ride the member's principal row
        let rows = w
            .engine
            .store()
            .transactions_by_reference(&receipt.reference)
            .unwrap();
        let principal = rows
            .iter()
            .find(|r| r.account_id == member && r.role == LegRole::Principal)
            .unwrap();
        assert_eq!(principal.fee, tzs(dec!(500)));
        assert_eq!(principal.tax, tzs(dec!(90)));

        // the notice reports the balance after charges, not before
        let notices = w.notifier.sent();
        assert_eq!(notices.last().unwrap().new_balance, tzs(dec!(99410)));
    }

    /// Verifies amounts at the exemption threshold carry fee but no VAT
    #[tokio::test]
    async fn test_small_withdrawal_is_vat_exempt() {
        let w = world();
        w.open_primary(100).await;
        w.open_counter(50).await;
        let member = w.seed_member(tzs(dec!(50000)));

        let receipt = w
            .engine
            .posting()
            .post_member_operation(
                &w.ctx(w.counter_user),
                MemberPostingRequest {
                    account_id: member,
                    operation: OperationType::CashWithdrawal,
                    amount: tzs(dec!(10000)),
                    narration: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(receipt.fee, tzs(dec!(50)));
        assert!(receipt.tax.is_zero());
        assert_eq!(w.balance(member), tzs(dec!(39950)));
    }

    /// Verifies a failed posting reverts its reference and the next
    /// posting takes the next number in sequence
    #[tokio::test]
    async fn test_withdrawal_beyond_balance_reverts_the_reference() {
        let w = world();
        w.open_primary(100).await;
        w.open_counter(50).await;
        let member = w.seed_member(tzs(dec!(5000)));

        let err = w
            .engine
            .posting()
            .post_member_operation(
                &w.ctx(w.counter_user),
                MemberPostingRequest {
                    account_id: member,
                    operation: OperationType::CashWithdrawal,
                    amount: tzs(dec!(100000)),
                    narration: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("Insufficient funds"));
        assert_eq!(w.balance(member), tzs(dec!(5000)));
        assert_eq!(w.till_balance(&w.counter), tzs(dec!(500000)));

        let burned = TransactionReference::from_code("CW-001-20250314-00001");
        assert_eq!(
            w.engine.store().reference_status(&burned),
            Some(ReservationStatus::Reverted)
        );
        assert!(w
            .engine
            .store()
            .transactions_by_reference(&burned)
            .unwrap()
            .is_empty());

        let receipt = w
            .engine
            .posting()
            .post_member_operation(
                &w.ctx(w.counter_user),
                MemberPostingRequest {
                    account_id: member,
                    operation: OperationType::CashWithdrawal,
                    amount: tzs(dec!(2000)),
                    narration: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(receipt.reference.to_string(), "CW-001-20250314-00002");
    }

    /// Verifies book operations are routed to the approval workflow
    #[tokio::test]
    async fn test_none_cash_operations_do_not_post_at_the_counter() {
        let w = world();
        let member = w.seed_member(tzs(dec!(50000)));

        let err = w
            .engine
            .posting()
            .post_member_operation(
                &w.ctx(w.counter_user),
                MemberPostingRequest {
                    account_id: member,
                    operation: OperationType::NoneCashDebit,
                    amount: tzs(dec!(1000)),
                    narration: None,
                },
            )
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("submit it through the approval workflow"));
    }

    /// Verifies a teller with no open drawer cannot take cash
    #[tokio::test]
    async fn test_posting_needs_an_open_drawer() {
        let w = world();
        let member = w.seed_member(tzs(dec!(50000)));

        let err = w
            .engine
            .posting()
            .post_member_operation(
                &w.ctx(w.counter_user),
                MemberPostingRequest {
                    account_id: member,
                    operation: OperationType::CashDeposit,
                    amount: tzs(dec!(10000)),
                    narration: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("is not open"));
    }

    /// Verifies a user without a daily teller assignment is turned away
    #[tokio::test]
    async fn test_unassigned_user_cannot_post() {
        let w = world();
        let member = w.seed_member(tzs(dec!(50000)));

        let err = w
            .engine
            .posting()
            .post_member_operation(
                &w.ctx(w.supervisor),
                MemberPostingRequest {
                    account_id: member,
                    operation: OperationType::CashDeposit,
                    amount: tzs(dec!(10000)),
                    narration: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert!(err.to_string().contains("holds no teller"));
    }

    /// Verifies a visiting member's posting flags its reference as
    /// inter-branch, and that a failed notice never fails the posting
    #[tokio::test]
    async fn test_visiting_member_reference_carries_the_inter_branch_flag() {
        let w = world();
        w.open_primary(100).await;
        w.open_counter(50).await;

        // domiciled at another branch, unknown to this branch's directory
        let mut account = Account::member(MemberId::new(), BranchId::new(), Currency::TZS);
        account.credit(&tzs(dec!(50000))).unwrap();
        let visiting = account.id;
        w.engine.store().seed_account(account).unwrap();

        let receipt = w
            .engine
            .posting()
            .post_member_operation(
                &w.ctx(w.counter_user),
                MemberPostingRequest {
                    account_id: visiting,
                    operation: OperationType::CashDeposit,
                    amount: tzs(dec!(20000)),
                    narration: None,
                },
            )
            .await
            .unwrap();

        assert!(receipt
            .reference
            .to_string()
            .starts_with("CDI-001-20250314-"));
        assert_eq!(w.balance(visiting), tzs(dec!(70000)));
        assert!(w.notifier.sent().is_empty());
    }

    /// Verifies request validation fires before any teller resolution
    #[tokio::test]
    async fn test_request_validation_rejects_bad_input() {
        let w = world();
        let member = w.seed_member(tzs(dec!(50000)));

        let err = w
            .engine
            .posting()
            .post_member_operation(
                &w.ctx(w.counter_user),
                MemberPostingRequest {
                    account_id: member,
                    operation: OperationType::CashDeposit,
                    amount: tzs(dec!(0)),
                    narration: None,
                },
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("strictly positive"));

        let err = w
            .engine
            .posting()
            .post_member_operation(
                &w.ctx(w.counter_user),
                MemberPostingRequest {
                    account_id: member,
                    operation: OperationType::CashDeposit,
                    amount: tzs(dec!(10000)),
                    narration: Some("x".repeat(201)),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

// ============================================================================
// APPROVAL WORKFLOW TESTS
// ============================================================================

mod approval_workflow {
    use super::*;

    /// Submits a reversal, walks it through the workflow and treats it
    /// with the primary teller
    async fn run_reversal(w: &World, original: &TransactionReference) -> ApprovalOutcome {
        let request = w
            .engine
            .approvals()
            .submit(
                &w.ctx(w.counter_user),
                ApprovalPayload::Reversal {
                    original_reference: original.clone(),
                    reason: "cash was counted twice".to_string(),
                },
                None,
            )
            .unwrap();
        w.engine
            .approvals()
            .validate_request(&w.ctx(w.supervisor), request.id, None)
            .unwrap();
        w.engine
            .approvals()
            .approve(&w.ctx(w.supervisor), request.id, None)
            .await
            .unwrap();
        w.engine
            .approvals()
            .treat(&w.ctx(w.primary_user), request.id, None)
            .await
            .unwrap()
    }

    /// Verifies a none-cash credit settles at the approve step, with the
    /// posted reference stamped on the request
    #[tokio::test]
    async fn test_none_cash_credit_settles_when_approved() {
        let w = world();
        let member = w.seed_member(tzs(dec!(50000)));

        let request = w
            .engine
            .approvals()
            .submit(
                &w.ctx(w.back_office_user),
                ApprovalPayload::NoneCash {
                    account_id: member,
                    direction: PostingDirection::Credit,
                    amount: tzs(dec!(20000)),
                    narration: Some("standing order interest".to_string()),
                },
                Some("march run".to_string()),
            )
            .unwrap();
        assert_eq!(request.status, ApprovalStatus::Pending);

        w.engine
            .approvals()
            .validate_request(&w.ctx(w.supervisor), request.id, None)
            .unwrap();
        let outcome = w
            .engine
            .approvals()
            .approve(&w.ctx(w.supervisor), request.id, Some("checked".to_string()))
            .await
            .unwrap();

        assert_eq!(outcome.request.status, ApprovalStatus::Approved);
        let receipt = outcome.receipt.unwrap();
        assert!(receipt.reference.to_string().starts_with("NC-001-20250314-"));
        assert_eq!(
            outcome.request.posted_reference,
            Some(receipt.reference.clone())
        );
        assert_eq!(w.balance(member), tzs(dec!(70000)));
        assert_eq!(receipt.new_balance, Some(tzs(dec!(70000))));

        // a book entry touches no drawer
        assert!(w
            .engine
            .store()
            .teller_operations_for(w.back_office.id)
            .unwrap()
            .is_empty());
        assert_eq!(w.notifier.sent().len(), 1);
    }

    /// Verifies the submit-time probe rejects movements the account
    /// cannot cover, without touching the stored balance
    #[tokio::test]
    async fn test_insufficient_funds_surface_at_submit() {
        let w = world();
        let member = w.seed_member(tzs(dec!(5000)));

        let err = w
            .engine
            .approvals()
            .submit(
                &w.ctx(w.back_office_user),
                ApprovalPayload::NoneCash {
                    account_id: member,
                    direction: PostingDirection::Debit,
                    amount: tzs(dec!(20000)),
                    narration: None,
                },
                None,
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(w
            .engine
            .approvals()
            .queue(ApprovalStatus::Pending)
            .unwrap()
            .is_empty());
        assert_eq!(w.balance(member), tzs(dec!(5000)));
        assert!(w
            .engine
            .store()
            .transactions_for_account(member)
            .unwrap()
            .is_empty());
    }

    /// Verifies the maker cannot validate their own request
    #[tokio::test]
    async fn test_checker_must_differ_from_maker() {
        let w = world();
        let member = w.seed_member(tzs(dec!(50000)));

        let request = w
            .engine
            .approvals()
            .submit(
                &w.ctx(w.back_office_user),
                ApprovalPayload::NoneCash {
                    account_id: member,
                    direction: PostingDirection::Credit,
                    amount: tzs(dec!(10000)),
                    narration: None,
                },
                None,
            )
            .unwrap();

        let err = w
            .engine
            .approvals()
            .validate_request(&w.ctx(w.back_office_user), request.id, None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(
            w.engine.approvals().request(request.id).unwrap().status,
            ApprovalStatus::Pending
        );
    }

    /// Verifies the maker may withdraw their own validated request
    #[tokio::test]
    async fn test_maker_may_withdraw_their_own_request() {
        let w = world();
        let member = w.seed_member(tzs(dec!(50000)));

        let request = w
            .engine
            .approvals()
            .submit(
                &w.ctx(w.back_office_user),
                ApprovalPayload::NoneCash {
                    account_id: member,
                    direction: PostingDirection::Credit,
                    amount: tzs(dec!(10000)),
                    narration: None,
                },
                None,
            )
            .unwrap();
        w.engine
            .approvals()
            .validate_request(&w.ctx(w.supervisor), request.id, None)
            .unwrap();

        let rejected = w
            .engine
            .approvals()
            .reject(
                &w.ctx(w.back_office_user),
                request.id,
                Some("raised in error".to_string()),
            )
            .unwrap();

        assert_eq!(rejected.status, ApprovalStatus::Rejected);
        assert!(w
            .engine
            .approvals()
            .queue(ApprovalStatus::Validated)
            .unwrap()
            .is_empty());
        assert_eq!(w.balance(member), tzs(dec!(50000)));
    }

    /// Verifies a settled none-cash request has nothing left to treat
    #[tokio::test]
    async fn test_treating_an_approved_none_cash_is_refused() {
        let w = world();
        let member = w.seed_member(tzs(dec!(50000)));

        let request = w
            .engine
            .approvals()
            .submit(
                &w.ctx(w.back_office_user),
                ApprovalPayload::NoneCash {
                    account_id: member,
                    direction: PostingDirection::Credit,
                    amount: tzs(dec!(10000)),
                    narration: None,
                },
                None,
            )
            .unwrap();
        w.engine
            .approvals()
            .validate_request(&w.ctx(w.supervisor), request.id, None)
            .unwrap();
        w.engine
            .approvals()
            .approve(&w.ctx(w.supervisor), request.id, None)
            .await
            .unwrap();

        let err = w
            .engine
            .approvals()
            .treat(&w.ctx(w.primary_user), request.id, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nothing to treat"));
        assert_eq!(w.balance(member), tzs(dec!(60000)));
    }

    /// Verifies a treated reversal restores the member and routes the
    /// returned cash through the treating teller's drawer
    #[tokio::test]
    async fn test_reversal_returns_cash_through_the_treating_drawer() {
        let w = world();
        w.open_primary(100).await;
        w.open_counter(50).await;
        let member = w.seed_member(tzs(dec!(50000)));

        let deposit = w.deposit(member, dec!(100000)).await;
        assert_eq!(w.balance(member), tzs(dec!(150000)));
        assert_eq!(w.till_balance(&w.counter), tzs(dec!(600000)));

        let outcome = run_reversal(&w, &deposit).await;
        let receipt = outcome.receipt.unwrap();

        assert_eq!(outcome.request.status, ApprovalStatus::Treated);
        assert!(receipt.reference.to_string().starts_with("RV-001-20250314-"));
        assert_eq!(w.balance(member), tzs(dec!(50000)));
        // cash leaves the primary drawer, not the original counter drawer
        assert_eq!(w.till_balance(&w.primary), tzs(dec!(400000)));
        assert_eq!(w.till_balance(&w.counter), tzs(dec!(600000)));
        assert!(w.gl_balance(GlKind::CashSettlement).is_zero());

        let rows = w
            .engine
            .store()
            .transactions_by_reference(&receipt.reference)
            .unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows
            .iter()
            .all(|r| r.related_reference.as_ref() == Some(&deposit)));

        let drawer_ops: Vec<_> = w
            .engine
            .store()
            .teller_operations_for(w.primary.id)
            .unwrap()
            .into_iter()
            .filter(|op| op.operation_type == OperationType::Reversal)
            .collect();
        assert_eq!(drawer_ops.len(), 1);
        assert_eq!(drawer_ops[0].direction, PostingDirection::Debit);
    }

    /// Verifies a reversal request needs posted legs to point at
    #[tokio::test]
    async fn test_unknown_reference_cannot_be_reversed() {
        let w = world();
        let err = w
            .engine
            .approvals()
            .submit(
                &w.ctx(w.counter_user),
                ApprovalPayload::Reversal {
                    original_reference: TransactionReference::from_code("CD-001-20250314-09999"),
                    reason: "no such posting".to_string(),
                },
                None,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("No posted legs"));
    }

    /// Verifies a posting reverses only once, and the compensating
    /// posting itself can never be reversed
    #[tokio::test]
    async fn test_reversals_are_terminal() {
        let w = world();
        w.open_primary(100).await;
        w.open_counter(50).await;
        let member = w.seed_member(tzs(dec!(50000)));
        let deposit = w.deposit(member, dec!(100000)).await;

        let outcome = run_reversal(&w, &deposit).await;

        let err = w
            .engine
            .approvals()
            .submit(
                &w.ctx(w.counter_user),
                ApprovalPayload::Reversal {
                    original_reference: deposit.clone(),
                    reason: "second thoughts".to_string(),
                },
                None,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("was already reversed"));

        let reversal_reference = outcome.receipt.unwrap().reference;
        let err = w
            .engine
            .approvals()
            .submit(
                &w.ctx(w.counter_user),
                ApprovalPayload::Reversal {
                    original_reference: reversal_reference,
                    reason: "undo the undo".to_string(),
                },
                None,
            )
            .unwrap_err();
        assert!(err.to_string().contains("cannot itself be reversed"));
    }

    /// Verifies a treated request posts exactly once; a second treat is
    /// refused and writes nothing
    #[tokio::test]
    async fn test_a_second_treat_posts_nothing() {
        let w = world();
        w.open_primary(100).await;
        w.open_counter(50).await;
        let member = w.seed_member(tzs(dec!(50000)));
        let deposit = w.deposit(member, dec!(100000)).await;

        let outcome = run_reversal(&w, &deposit).await;
        let reversal = outcome.receipt.unwrap().reference;

        let err = w
            .engine
            .approvals()
            .treat(&w.ctx(w.primary_user), outcome.request.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("already processed"));

        // one compensating set only, balances where the first treat left them
        let rows = w
            .engine
            .store()
            .transactions_by_reference(&reversal)
            .unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(w.balance(member), tzs(dec!(50000)));
        assert_eq!(w.till_balance(&w.primary), tzs(dec!(400000)));

        let key = ReferenceKey::new("001", OperationType::Reversal, date(), false);
        assert_eq!(w.engine.store().references_issued(&key), 1);
    }

    /// Verifies treating a cash reversal needs the treating drawer open,
    /// and a failed treat leaves the request Approved
    #[tokio::test]
    async fn test_cash_reversal_needs_an_open_treating_drawer() {
        let w = world();
        w.open_primary(100).await;
        w.open_counter(50).await;
        let member = w.seed_member(tzs(dec!(50000)));
        let deposit = w.deposit(member, dec!(100000)).await;

        w.engine
            .tills()
            .close_till(
                &w.ctx(w.primary_user),
                TillCloseRequest {
                    teller_id: w.primary.id,
                    cash_at_hand: tzs(dec!(500000)),
                    denominations: notes(50),
                    narration: None,
                },
            )
            .unwrap();

        let request = w
            .engine
            .approvals()
            .submit(
                &w.ctx(w.counter_user),
                ApprovalPayload::Reversal {
                    original_reference: deposit,
                    reason: "cash was counted twice".to_string(),
                },
                None,
            )
            .unwrap();
        w.engine
            .approvals()
            .validate_request(&w.ctx(w.supervisor), request.id, None)
            .unwrap();
        w.engine
            .approvals()
            .approve(&w.ctx(w.supervisor), request.id, None)
            .await
            .unwrap();

        let err = w
            .engine
            .approvals()
            .treat(&w.ctx(w.primary_user), request.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(
            w.engine.approvals().request(request.id).unwrap().status,
            ApprovalStatus::Approved
        );
        assert_eq!(w.balance(member), tzs(dec!(150000)));

        // the drawer check runs before a reference is drawn
        let key = ReferenceKey::new("001", OperationType::Reversal, date(), false);
        assert_eq!(w.engine.store().references_issued(&key), 0);
    }

    /// Verifies sub tellers lack the reversal right by default
    #[tokio::test]
    async fn test_sub_tellers_cannot_treat_reversals() {
        let w = world();
        w.open_primary(100).await;
        w.open_counter(50).await;
        let member = w.seed_member(tzs(dec!(50000)));
        let deposit = w.deposit(member, dec!(100000)).await;

        let request = w
            .engine
            .approvals()
            .submit(
                &w.ctx(w.primary_user),
                ApprovalPayload::Reversal {
                    original_reference: deposit,
                    reason: "cash was counted twice".to_string(),
                },
                None,
            )
            .unwrap();
        w.engine
            .approvals()
            .validate_request(&w.ctx(w.supervisor), request.id, None)
            .unwrap();
        w.engine
            .approvals()
            .approve(&w.ctx(w.supervisor), request.id, None)
            .await
            .unwrap();

        let err = w
            .engine
            .approvals()
            .treat(&w.ctx(w.counter_user), request.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert!(err.to_string().contains("may not perform"));
    }

    /// Verifies reversing a book entry needs no drawer at all
    #[tokio::test]
    async fn test_book_entry_reversals_need_no_drawer() {
        let w = world();
        let member = w.seed_member(tzs(dec!(50000)));

        let request = w
            .engine
            .approvals()
            .submit(
                &w.ctx(w.back_office_user),
                ApprovalPayload::NoneCash {
                    account_id: member,
                    direction: PostingDirection::Credit,
                    amount: tzs(dec!(20000)),
                    narration: None,
                },
                None,
            )
            .unwrap();
        w.engine
            .approvals()
            .validate_request(&w.ctx(w.supervisor), request.id, None)
            .unwrap();
        let settled = w
            .engine
            .approvals()
            .approve(&w.ctx(w.supervisor), request.id, None)
            .await
            .unwrap();
        let book_reference = settled.receipt.unwrap().reference;
        assert_eq!(w.balance(member), tzs(dec!(70000)));

        // no till is open anywhere, yet the reversal treats cleanly
        let outcome = run_reversal(&w, &book_reference).await;
        assert_eq!(outcome.request.status, ApprovalStatus::Treated);
        assert_eq!(w.balance(member), tzs(dec!(50000)));
        assert_eq!(outcome.receipt.unwrap().legs.len(), 2);
    }
}

// ============================================================================
// REMITTANCE TESTS
// ============================================================================

mod remittances {
    use super::*;

    /// Verifies funding takes principal plus charges into the drawer and
    /// stages the payout request in the same commit
    #[tokio::test]
    async fn test_funding_takes_cash_and_stages_the_payout() {
        let w = world();
        w.open_primary(100).await;
        w.open_counter(50).await;

        let (receipt, payout) = w
            .engine
            .posting()
            .fund_remittance(
                &w.ctx(w.counter_user),
                RemittanceFundingRequest {
                    beneficiary: "Neema Joseph".to_string(),
                    amount: tzs(dec!(50000)),
                    narration: Some("school fees".to_string()),
                },
            )
            .await
            .unwrap();

        assert!(receipt.reference.to_string().starts_with("RF-001-20250314-"));
        assert_eq!(receipt.fee, tzs(dec!(500)));
        assert_eq!(receipt.tax, tzs(dec!(90)));
        assert_eq!(w.till_balance(&w.counter), tzs(dec!(550590)));
        assert_eq!(w.gl_balance(GlKind::RemittancePayable), tzs(dec!(50000)));
        assert_eq!(w.gl_balance(GlKind::FeeIncome), tzs(dec!(500)));
        assert_eq!(w.gl_balance(GlKind::VatPayable), tzs(dec!(90)));

        assert_eq!(payout.status, ApprovalStatus::Pending);
        match &payout.payload {
            ApprovalPayload::RemittancePayout {
                funding_reference,
                beneficiary,
                amount,
            } => {
                assert_eq!(funding_reference, &receipt.reference);
                assert_eq!(beneficiary, "Neema Joseph");
                assert_eq!(*amount, tzs(dec!(50000)));
            }
            other => panic!("unexpected payload {other:?}"),
        }
        assert_eq!(
            w.engine
                .approvals()
                .queue(ApprovalStatus::Pending)
                .unwrap()
                .len(),
            1
        );
    }

    /// Verifies the payout pays out of the treating teller's drawer and
    /// clears the payable
    #[tokio::test]
    async fn test_payout_leaves_the_treating_drawer() {
        let w = world();
        w.open_primary(100).await;
        w.open_counter(50).await;

        let (receipt, payout) = w
            .engine
            .posting()
            .fund_remittance(
                &w.ctx(w.counter_user),
                RemittanceFundingRequest {
                    beneficiary: "Neema Joseph".to_string(),
                    amount: tzs(dec!(50000)),
                    narration: None,
                },
            )
            .await
            .unwrap();

        w.engine
            .approvals()
            .validate_request(&w.ctx(w.supervisor), payout.id, None)
            .unwrap();
        w.engine
            .approvals()
            .approve(&w.ctx(w.supervisor), payout.id, None)
            .await
            .unwrap();
        let outcome = w
            .engine
            .approvals()
            .treat(
                &w.ctx(w.primary_user),
                payout.id,
                Some("paid to Neema Joseph".to_string()),
            )
            .await
            .unwrap();
        let paid = outcome.receipt.unwrap();

        assert!(paid.reference.to_string().starts_with("RP-001-20250314-"));
        assert_eq!(paid.amount, tzs(dec!(50000)));
        assert_eq!(w.till_balance(&w.primary), tzs(dec!(450000)));
        assert_eq!(w.till_balance(&w.counter), tzs(dec!(550590)));
        assert!(w.gl_balance(GlKind::RemittancePayable).is_zero());
        assert_eq!(outcome.request.status, ApprovalStatus::Treated);

        let rows = w
            .engine
            .store()
            .transactions_by_reference(&paid.reference)
            .unwrap();
        assert!(rows
            .iter()
            .all(|r| r.related_reference.as_ref() == Some(&receipt.reference)));
    }

    /// Verifies a funding that fails its till check stages no payout
    #[tokio::test]
    async fn test_funding_failure_stages_nothing() {
        let w = world();
        let err = w
            .engine
            .posting()
            .fund_remittance(
                &w.ctx(w.counter_user),
                RemittanceFundingRequest {
                    beneficiary: "Neema Joseph".to_string(),
                    amount: tzs(dec!(50000)),
                    narration: None,
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(w
            .engine
            .approvals()
            .queue(ApprovalStatus::Pending)
            .unwrap()
            .is_empty());
    }

    /// Verifies the beneficiary name is required
    #[tokio::test]
    async fn test_blank_beneficiary_is_rejected() {
        let w = world();
        let err = w
            .engine
            .posting()
            .fund_remittance(
                &w.ctx(w.counter_user),
                RemittanceFundingRequest {
                    beneficiary: String::new(),
                    amount: tzs(dec!(50000)),
                    narration: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    /// Verifies payout requests only enter through funding
    #[tokio::test]
    async fn test_direct_payout_submission_is_refused() {
        let w = world();
        let err = w
            .engine
            .approvals()
            .submit(
                &w.ctx(w.counter_user),
                ApprovalPayload::RemittancePayout {
                    funding_reference: TransactionReference::from_code("RF-001-20250314-00001"),
                    beneficiary: "Neema Joseph".to_string(),
                    amount: tzs(dec!(50000)),
                },
                None,
            )
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("raised by remittance funding"));
    }
}
