//! Custom Test Assertions
//!
//! Specialized assertion helpers for posting-engine types that give more
//! meaningful failure messages than bare equality checks.

use core_kernel::{ErrorKind, Money, OperationError, PostingDirection};
use domain_ledger::TransactionRecord;
use rust_decimal::Decimal;

/// Asserts that a Money value carries exactly the given amount
pub fn assert_amount(actual: &Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Amount mismatch: actual={} {}, expected={}",
        actual.currency(),
        actual.amount(),
        expected
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero, got {} {}",
        money.currency(),
        money.amount()
    );
}

/// Asserts that posted rows net to zero, debits against credits
///
/// # Panics
///
/// Panics if the debit total and the credit total differ
pub fn assert_rows_balance(rows: &[TransactionRecord]) {
    let mut debits = Decimal::ZERO;
    let mut credits = Decimal::ZERO;
    for row in rows {
        match row.direction {
            PostingDirection::Debit => debits += row.amount.amount(),
            PostingDirection::Credit => credits += row.amount.amount(),
        }
    }
    assert_eq!(
        debits, credits,
        "Rows do not balance: debits={}, credits={}, rows={}",
        debits,
        credits,
        rows.len()
    );
}

/// Asserts that every row carries the given reference
pub fn assert_rows_share_reference(rows: &[TransactionRecord], reference: &str) {
    for row in rows {
        assert_eq!(
            row.reference.as_str(),
            reference,
            "Row on account {} carries reference {}, expected {}",
            row.account_id,
            row.reference,
            reference
        );
    }
}

/// Asserts that a result failed with the given error kind, returning the
/// error for further message checks
pub fn assert_err_kind<T: std::fmt::Debug>(
    result: Result<T, OperationError>,
    kind: ErrorKind,
) -> OperationError {
    match result {
        Ok(value) => panic!("Expected {kind:?} error, got Ok({value:?})"),
        Err(err) => {
            assert_eq!(
                err.kind(),
                kind,
                "Expected {:?}, got {:?}: {}",
                kind,
                err.kind(),
                err.message()
            );
            err
        }
    }
}

/// Asserts that a result is Ok and returns the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Asserts that a result is Err and returns the error
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        match $result {
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => e,
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => panic!("{}: got Ok({:?})", $msg, value),
            Err(e) => e,
        }
    };
}
