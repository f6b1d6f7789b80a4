//! Application services for the posting engine
//!
//! This crate owns the orchestration layer: the posting orchestrator that
//! executes every financial operation as one atomic unit, the till lifecycle
//! service, the approval workflow, the accounting calendar and the teller
//! registry. Outbound collaborators (branch directory, customer directory,
//! notification delivery) are reached through port traits defined here.

pub mod approvals;
pub mod calendar;
pub mod config;
pub mod context;
pub mod engine;
pub mod ports;
pub mod posting;
pub mod tellers;
pub mod till;

pub use approvals::{ApprovalOutcome, ApprovalService};
pub use calendar::AccountingCalendar;
pub use config::CoreConfig;
pub use context::OperatorContext;
pub use engine::CoreEngine;
pub use ports::{
    BranchDirectory, BranchInfo, CustomerDirectory, MemberInfo, Notifier, PostingNotice,
    RecordingNotifier, StaticBranchDirectory, StaticCustomerDirectory,
};
pub use posting::{
    MemberPostingRequest, PostingOrchestrator, PostingReceipt, RemittanceFundingRequest,
};
pub use tellers::TellerRegistry;
pub use till::{
    TillCloseRequest, TillCloseSummary, TillOpenRequest, TillReplenishRequest, TillService,
};
