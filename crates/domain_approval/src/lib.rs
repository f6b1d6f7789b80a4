//! Approval domain: the maker-checker workflow
//!
//! Reversals, none-cash member operations and remittance payouts all pass
//! through the same request machine before any money moves. The graph and
//! its guards are identical for every payload; only the settlement point
//! differs.

pub mod error;
pub mod payload;
pub mod request;

pub use error::ApprovalError;
pub use payload::{ApprovalPayload, Settlement};
pub use request::{ApprovalAction, ApprovalRequest, ApprovalStatus};
