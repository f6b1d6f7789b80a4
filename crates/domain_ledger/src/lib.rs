//! Ledger Domain - Accounts, Posting Rows and References
//!
//! This crate implements the account-side core of the posting engine:
//! balance mutation primitives with full before/after audit, immutable
//! transaction rows, reference-code formatting and the charge schedule.
//!
//! # Posting Principles
//!
//! - Accounts snapshot `previous_balance` before every mutation; the exact
//!   amount passed moves the balance, decimal-exact.
//! - Debits respect the account's minimum-balance floor; till accounts floor
//!   at zero (drawer cash), general-ledger positions are unbounded.
//! - An orchestrated operation stages its legs as matched debit/credit
//!   pairs; the full leg set nets to zero.
//! - Charges (fee, VAT on fee) are derived and rounded half away from zero
//!   in one place; posting paths never round.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{Account, LedgerEntry};
//!
//! let mut member = Account::member(member_id, branch_id, currency);
//! member.credit(&deposit_amount)?;
//!
//! let entry = LedgerEntry::new(currency)
//!     .pair(settlement_gl, member.id, deposit_amount, LegRole::Principal)
//!     .pair(vault_gl, till.id, deposit_amount, LegRole::Custody);
//! entry.validate()?;
//! ```

pub mod account;
pub mod charges;
pub mod entry;
pub mod error;
pub mod record;

pub use account::{Account, AccountHolder, GlKind, MinimumBalance};
pub use charges::{ChargeSchedule, Charges};
pub use entry::{LedgerEntry, PlannedLeg};
pub use error::LedgerError;
pub use record::{TellerOperationRecord, TransactionRecord};
