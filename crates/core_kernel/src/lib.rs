//! Core Kernel - Foundational types and utilities for the banking core
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Accounting-day temporal types (posting dates, not wall clock)
//! - Strongly-typed identifiers
//! - Shared posting vocabulary (operation types, directions, leg roles)
//! - Transaction reference codes and reservation states
//! - The service-boundary error taxonomy and the outbound port error type

pub mod error;
pub mod identifiers;
pub mod money;
pub mod operations;
pub mod ports;
pub mod reference;
pub mod temporal;

pub use error::{ErrorKind, OperationError};
pub use identifiers::{
    AccountId, ApprovalRequestId, BranchId, DailyTellerId, MemberId, TellerId,
    TellerOperationId, TillSessionId, TransactionId, UserId,
};
pub use money::{Currency, Money, MoneyError, Rate};
pub use operations::{LegRole, OperationCategory, OperationType, PostingDirection};
pub use ports::PortError;
pub use reference::{ReferenceKey, ReservationStatus, TransactionReference};
pub use temporal::AccountingDay;
