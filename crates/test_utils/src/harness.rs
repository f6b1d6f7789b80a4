//! In-Process Engine Harness
//!
//! Stands up a fully seeded branch around a [`CoreEngine`]: general-ledger
//! accounts, a primary till, a counter till, a none-cash operating point,
//! daily user assignments and an open accounting day. Integration tests
//! drive the real services against it; the recording notifier exposes what
//! would have been sent to members.

use std::sync::Arc;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use app_services::{
    BranchInfo, CoreConfig, CoreEngine, OperatorContext, PostingReceipt, RecordingNotifier,
    StaticBranchDirectory, StaticCustomerDirectory, TillOpenRequest,
};
use core_kernel::{AccountId, BranchId, Currency, Money, TellerId, UserId};
use domain_ledger::{Account, GlKind};
use domain_teller::{CashBreakdown, Teller, TellerKind};
use infra_store::MemoryStore;

use crate::builders::MemberAccountBuilder;
use crate::fixtures::{BreakdownFixtures, MemberFixtures, StringFixtures, TemporalFixtures};

static TRACING: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
});

/// Installs the test tracing subscriber once per process
pub fn init_test_tracing() {
    Lazy::force(&TRACING);
}

/// A teller seeded into the harness, with the user holding it today
#[derive(Debug, Clone, Copy)]
pub struct SeededTeller {
    pub teller_id: TellerId,
    pub user_id: UserId,
    /// Till account, absent for the none-cash operating point
    pub till_account: Option<AccountId>,
}

/// A branch world wired to an engine over an in-memory store
pub struct BranchHarness {
    pub engine: CoreEngine,
    pub branch_id: BranchId,
    pub currency: Currency,
    pub accounting_date: NaiveDate,
    pub supervisor: UserId,
    /// Primary till holding the branch float
    pub primary: SeededTeller,
    /// Customer-facing sub till
    pub counter: SeededTeller,
    /// None-cash operating point, no drawer
    pub back_office: SeededTeller,
    pub notifier: Arc<RecordingNotifier>,
    customers: Arc<StaticCustomerDirectory>,
}

impl BranchHarness {
    /// Seeds a branch with the default configuration
    pub fn new() -> Self {
        Self::with_config(CoreConfig::default())
    }

    /// Seeds a branch that charges no fees, for balance-focused tests
    pub fn without_charges() -> Self {
        Self::with_config(CoreConfig {
            withdrawal_fee_rate: Decimal::ZERO,
            remittance_fee_rate: Decimal::ZERO,
            vat_rate: Decimal::ZERO,
            vat_exemption_threshold: None,
            ..CoreConfig::default()
        })
    }

    /// Seeds a branch with the given configuration
    pub fn with_config(config: CoreConfig) -> Self {
        init_test_tracing();

        let currency = config.currency;
        let accounting_date = TemporalFixtures::business_date();
        let branch_id = BranchId::new();
        let store = Arc::new(MemoryStore::new());

        for kind in [
            GlKind::BranchVault,
            GlKind::CashSettlement,
            GlKind::FeeIncome,
            GlKind::VatPayable,
            GlKind::RemittancePayable,
        ] {
            let account = Account::general_ledger(kind, branch_id, currency);
            let account_id = account.id;
            store.seed_account(account).expect("seed gl account");
            store
                .bind_gl_account(branch_id, kind, account_id)
                .expect("bind gl account");
        }

        let branches = Arc::new(StaticBranchDirectory::new().with_branch(BranchInfo {
            id: branch_id,
            code: StringFixtures::branch_code().to_string(),
            name: "Head Office".to_string(),
        }));
        let customers = Arc::new(StaticCustomerDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let engine = CoreEngine::with_store(
            store,
            config,
            branches,
            customers.clone(),
            notifier.clone(),
        );

        engine
            .calendar()
            .open_day(branch_id, accounting_date)
            .expect("open accounting day");

        let supervisor = UserId::new();
        let primary = seed_teller(
            &engine,
            branch_id,
            currency,
            "Primary Till",
            TellerKind::Primary,
            accounting_date,
            supervisor,
        );
        let counter = seed_teller(
            &engine,
            branch_id,
            currency,
            "Counter 1",
            TellerKind::Sub,
            accounting_date,
            supervisor,
        );
        let back_office = seed_teller(
            &engine,
            branch_id,
            currency,
            "Back Office",
            TellerKind::NoneCash,
            accounting_date,
            supervisor,
        );

        Self {
            engine,
            branch_id,
            currency,
            accounting_date,
            supervisor,
            primary,
            counter,
            back_office,
            notifier,
            customers,
        }
    }

    /// Context for the user holding the given seeded teller
    pub fn context_for(&self, teller: &SeededTeller) -> OperatorContext {
        OperatorContext::new(teller.user_id, self.branch_id)
    }

    /// Context for an arbitrary user at this branch
    pub fn context_for_user(&self, user_id: UserId) -> OperatorContext {
        OperatorContext::new(user_id, self.branch_id)
    }

    /// Seeds a member account with an opening balance and registers the
    /// holder with the customer directory
    pub fn seed_member(&self, opening_balance: Decimal) -> AccountId {
        let info = MemberFixtures::info();
        let account = MemberAccountBuilder::new(self.branch_id)
            .with_member(info.id)
            .with_currency(self.currency)
            .with_balance(opening_balance)
            .build();
        let account_id = account.id;
        self.engine
            .store()
            .seed_account(account)
            .expect("seed member account");
        self.customers.register(account_id, info);
        account_id
    }

    /// Current balance of an account
    pub fn balance(&self, account_id: AccountId) -> Money {
        self.engine
            .store()
            .account(account_id)
            .expect("account exists")
            .record
            .balance
    }

    /// Declared amount together with a matching single-bundle count
    pub fn counted(&self, amount: Decimal) -> (Money, CashBreakdown) {
        let money = Money::new(amount, self.currency);
        (money, BreakdownFixtures::bundle(money))
    }

    /// Opens the primary till with the given float
    pub async fn open_primary_till(&self, amount: Decimal) -> PostingReceipt {
        self.open(&self.primary, amount).await.expect("open primary till")
    }

    /// Opens the counter till from the primary till, which must be open
    pub async fn open_counter_till(&self, amount: Decimal) -> PostingReceipt {
        self.open(&self.counter, amount).await.expect("open counter till")
    }

    /// Opens a seeded teller's till, propagating the error
    pub async fn open(
        &self,
        teller: &SeededTeller,
        amount: Decimal,
    ) -> Result<PostingReceipt, core_kernel::OperationError> {
        let (money, denominations) = self.counted(amount);
        self.engine
            .tills()
            .open_till(
                &self.context_for(teller),
                TillOpenRequest {
                    teller_id: teller.teller_id,
                    amount: money,
                    denominations,
                },
            )
            .await
    }
}

impl Default for BranchHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn seed_teller(
    engine: &CoreEngine,
    branch_id: BranchId,
    currency: Currency,
    name: &str,
    kind: TellerKind,
    date: NaiveDate,
    supervisor: UserId,
) -> SeededTeller {
    let teller = Teller::new(branch_id, name, kind);
    let teller_id = teller.id;
    engine.store().seed_teller(teller).expect("seed teller");

    let till_account = if kind == TellerKind::NoneCash {
        None
    } else {
        let account = Account::till(teller_id, branch_id, currency);
        let account_id = account.id;
        engine
            .store()
            .seed_account(account)
            .expect("seed till account");
        engine
            .store()
            .bind_till_account(teller_id, account_id)
            .expect("bind till account");
        Some(account_id)
    };

    let user_id = UserId::new();
    engine
        .tellers()
        .assign_daily(teller_id, user_id, date, supervisor)
        .expect("assign daily teller");

    SeededTeller {
        teller_id,
        user_id,
        till_account,
    }
}
