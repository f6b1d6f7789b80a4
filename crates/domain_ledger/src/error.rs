//! Ledger domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{ErrorKind, MoneyError, OperationError};

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Debit would cross the account's minimum-balance floor
    #[error(
        "Insufficient funds in account {account}: balance {balance}, requested {requested}, minimum {minimum}"
    )]
    InsufficientFunds {
        account: String,
        balance: Decimal,
        requested: Decimal,
        minimum: Decimal,
    },

    /// Mutation attempted on an inactive account
    #[error("Account {0} is inactive")]
    InactiveAccount(String),

    /// Posting amount is negative, zero where disallowed, or at the wrong precision
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Money arithmetic failed (currency mismatch)
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The legs of an entry do not net to zero
    #[error("Unbalanced entry: debits={debits}, credits={credits}")]
    UnbalancedEntry { debits: Decimal, credits: Decimal },

    /// An entry was built with no legs
    #[error("Entry has no legs")]
    EmptyEntry,
}

impl From<LedgerError> for OperationError {
    fn from(err: LedgerError) -> Self {
        let kind = match &err {
            LedgerError::InsufficientFunds { .. }
            | LedgerError::InactiveAccount(_)
            | LedgerError::InvalidAmount(_)
            | LedgerError::Money(_) => ErrorKind::Validation,
            // An unbalanced or empty entry is a defect in leg construction,
            // never a caller mistake.
            LedgerError::UnbalancedEntry { .. } | LedgerError::EmptyEntry => ErrorKind::Internal,
        };
        OperationError::new(kind, err.to_string())
    }
}
