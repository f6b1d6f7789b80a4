//! Teller domain: tellers, daily assignments and till custody
//!
//! Branch cash lives in drawers. This crate models the configured tellers,
//! the daily binding of users to them, the counted denominations that move
//! between drawers, and the per-day till session from open of day to close.

pub mod denomination;
pub mod error;
pub mod teller;
pub mod till;

pub use denomination::{CashBreakdown, DenominationCount, DenominationKind};
pub use error::TellerError;
pub use teller::{DailyTeller, Teller, TellerKind};
pub use till::{TillSession, TillStatus};
