//! Teller domain errors

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{ErrorKind, OperationError, OperationType};

/// Errors that can occur in the teller domain
#[derive(Debug, Error)]
pub enum TellerError {
    /// The teller's rights do not cover the operation
    #[error("Teller {teller} may not perform {operation}")]
    RightsViolation {
        teller: String,
        operation: OperationType,
    },

    /// The teller is deactivated
    #[error("Teller {0} is inactive")]
    InactiveTeller(String),

    /// The acting user holds no teller for the date
    #[error("User {user} holds no teller on {date}")]
    NoDailyAssignment { user: String, date: NaiveDate },

    /// The teller is already held by a different user for the date
    #[error("Teller {teller} is held by {holder} for {date}")]
    TellerHeldByAnother {
        teller: String,
        holder: String,
        date: NaiveDate,
    },

    /// Denomination breakdown does not add up to the declared amount
    #[error("Denominations total {counted}, declared amount is {declared}")]
    DenominationMismatch { declared: Decimal, counted: Decimal },

    /// A denomination row is unusable (non-positive face value or zero count)
    #[error("Invalid denomination: {0}")]
    InvalidDenomination(String),

    /// A non-closed session already exists for the teller and date
    #[error("Till for teller {teller} is already open on {date}")]
    TillAlreadyOpen { teller: String, date: NaiveDate },

    /// The till day was closed; closed is terminal for the date
    #[error("Till for teller {teller} is closed on {date}")]
    TillClosed { teller: String, date: NaiveDate },

    /// Close was called twice for the same till day
    #[error("Till for teller {teller} was already closed on {date}")]
    TillAlreadyClosed { teller: String, date: NaiveDate },

    /// The operation needs an open till session that does not exist
    #[error("Till for teller {teller} is not open on {date}")]
    TillNotOpen { teller: String, date: NaiveDate },

    /// A sub till cannot open before the branch primary till
    #[error("Primary till for branch {branch} is not open on {date}")]
    PrimaryTillNotOpen { branch: String, date: NaiveDate },

    /// Monetary arithmetic failed while updating till figures
    #[error(transparent)]
    Money(#[from] core_kernel::MoneyError),
}

impl From<TellerError> for OperationError {
    fn from(err: TellerError) -> Self {
        let kind = match &err {
            TellerError::RightsViolation { .. }
            | TellerError::InactiveTeller(_)
            | TellerError::NoDailyAssignment { .. }
            | TellerError::TellerHeldByAnother { .. }
            | TellerError::TillClosed { .. } => ErrorKind::Forbidden,
            TellerError::DenominationMismatch { .. }
            | TellerError::InvalidDenomination(_)
            | TellerError::Money(_) => ErrorKind::Validation,
            TellerError::TillAlreadyOpen { .. }
            | TellerError::TillAlreadyClosed { .. }
            | TellerError::TillNotOpen { .. }
            | TellerError::PrimaryTillNotOpen { .. } => ErrorKind::Conflict,
        };
        OperationError::new(kind, err.to_string())
    }
}
