//! Property-Based Test Generators
//!
//! Proptest strategies for posting-engine data that hold the domain's
//! invariants: counted cash that adds up, amounts at currency precision,
//! dates inside an accounting year.

use chrono::NaiveDate;
use core_kernel::{AccountId, Currency, Money, OperationType, TellerId};
use domain_teller::{CashBreakdown, DenominationKind};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::TZS),
        Just(Currency::KES),
        Just(Currency::UGX),
        Just(Currency::RWF),
        Just(Currency::NGN),
        Just(Currency::GHS),
        Just(Currency::ZAR),
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
    ]
}

/// Strategy for positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for amounts in minor units, negative included
pub fn amount_minor_strategy() -> impl Strategy<Value = i64> {
    -1_000_000_000i64..1_000_000_000i64
}

/// Strategy for positive Money values in any currency
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for positive TZS Money values
pub fn tzs_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|amount| Money::from_minor(amount, Currency::TZS))
}

/// Strategy for operation types
pub fn operation_type_strategy() -> impl Strategy<Value = OperationType> {
    prop_oneof![
        Just(OperationType::CashDeposit),
        Just(OperationType::CashWithdrawal),
        Just(OperationType::NoneCashDebit),
        Just(OperationType::NoneCashCredit),
        Just(OperationType::TillOpening),
        Just(OperationType::TillReplenishment),
        Just(OperationType::Reversal),
        Just(OperationType::RemittanceFunding),
        Just(OperationType::RemittancePayout),
    ]
}

/// Strategy for TZS note face values as tellers count them
pub fn face_value_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(dec!(10000)),
        Just(dec!(5000)),
        Just(dec!(2000)),
        Just(dec!(1000)),
        Just(dec!(500)),
    ]
}

/// Strategy for a counted TZS drawer together with its declared amount
pub fn counted_cash_strategy() -> impl Strategy<Value = (CashBreakdown, Money)> {
    proptest::collection::vec((face_value_strategy(), 1u32..40u32), 1..6).prop_map(|rows| {
        let mut breakdown = CashBreakdown::new(Currency::TZS);
        for (face_value, count) in rows {
            breakdown.add(DenominationKind::Note, face_value, count);
        }
        let declared = Money::new(breakdown.total(), Currency::TZS);
        (breakdown, declared)
    })
}

/// Strategy for branch codes as they appear in references
pub fn branch_code_strategy() -> impl Strategy<Value = String> {
    "[0-9]{3}".prop_map(|s| s)
}

/// Strategy for accounting dates within one year
pub fn accounting_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..365i64).prop_map(|days| {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Duration::days(days)
    })
}

/// Strategy for generating AccountId
pub fn account_id_strategy() -> impl Strategy<Value = AccountId> {
    any::<[u8; 16]>().prop_map(|bytes| AccountId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for generating TellerId
pub fn teller_id_strategy() -> impl Strategy<Value = TellerId> {
    any::<[u8; 16]>().prop_map(|bytes| TellerId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for optional posting narrations
pub fn narration_strategy() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[a-z]{3,12}( [a-z]{3,12}){0,3}")
}
