//! Engine assembly
//!
//! Wires the store, the services and the outbound ports into one object.
//! Embedders construct a [`CoreEngine`] from configuration plus their port
//! implementations and drive everything through its accessors; the test
//! suites do the same with in-process fakes.

use std::sync::Arc;
use std::time::Duration;

use infra_store::MemoryStore;

use crate::approvals::ApprovalService;
use crate::calendar::AccountingCalendar;
use crate::config::CoreConfig;
use crate::ports::{BranchDirectory, CustomerDirectory, Notifier};
use crate::posting::PostingOrchestrator;
use crate::tellers::TellerRegistry;
use crate::till::TillService;

/// The assembled posting engine
pub struct CoreEngine {
    store: Arc<MemoryStore>,
    config: CoreConfig,
    calendar: AccountingCalendar,
    tellers: TellerRegistry,
    posting: Arc<PostingOrchestrator>,
    tills: TillService,
    approvals: ApprovalService,
}

impl CoreEngine {
    /// Builds an engine over a fresh store
    pub fn new(
        config: CoreConfig,
        branches: Arc<dyn BranchDirectory>,
        customers: Arc<dyn CustomerDirectory>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), config, branches, customers, notifier)
    }

    /// Builds an engine over an existing store, e.g. one already seeded
    pub fn with_store(
        store: Arc<MemoryStore>,
        config: CoreConfig,
        branches: Arc<dyn BranchDirectory>,
        customers: Arc<dyn CustomerDirectory>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let calendar = AccountingCalendar::new(store.clone());
        let tellers = TellerRegistry::new(store.clone());
        let posting = Arc::new(PostingOrchestrator::new(
            store.clone(),
            calendar.clone(),
            tellers.clone(),
            config.charge_schedule(),
            branches,
            customers,
            notifier,
            config.max_posting_retries,
            Duration::from_millis(config.retry_backoff_ms),
            config.notifications_enabled,
        ));
        let tills = TillService::new(posting.clone());
        let approvals = ApprovalService::new(store.clone(), posting.clone());
        Self {
            store,
            config,
            calendar,
            tellers,
            posting,
            tills,
            approvals,
        }
    }

    /// The shared store, for seeding and direct queries
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn calendar(&self) -> &AccountingCalendar {
        &self.calendar
    }

    pub fn tellers(&self) -> &TellerRegistry {
        &self.tellers
    }

    pub fn posting(&self) -> &PostingOrchestrator {
        &self.posting
    }

    pub fn tills(&self) -> &TillService {
        &self.tills
    }

    pub fn approvals(&self) -> &ApprovalService {
        &self.approvals
    }
}
