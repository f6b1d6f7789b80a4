//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for the posting engine. Amounts, dates and
//! identifiers are fixed so assertions stay predictable across runs;
//! member names and phone numbers come from `fake` where realism matters
//! more than determinism.

use app_services::MemberInfo;
use chrono::NaiveDate;
use core_kernel::{
    AccountId, BranchId, Currency, MemberId, Money, PostingDirection, TellerId,
    TransactionReference, UserId,
};
use domain_approval::ApprovalPayload;
use domain_teller::{CashBreakdown, DenominationKind};
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Standard deposit amount in the operating currency
    pub fn tzs_100k() -> Money {
        Money::new(dec!(100000), Currency::TZS)
    }

    /// Standard withdrawal amount
    pub fn tzs_20k() -> Money {
        Money::new(dec!(20000), Currency::TZS)
    }

    /// Typical primary till float
    pub fn tzs_float() -> Money {
        Money::new(dec!(500000), Currency::TZS)
    }

    /// Zero in the operating currency
    pub fn tzs_zero() -> Money {
        Money::zero(Currency::TZS)
    }

    /// Foreign amount for currency mismatch tests
    pub fn kes_100() -> Money {
        Money::new(dec!(100.00), Currency::KES)
    }

    /// Amount in a zero-decimal-place currency
    pub fn ugx_50k() -> Money {
        Money::new(dec!(50000), Currency::UGX)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard accounting date for a seeded branch
    pub fn business_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    /// The following accounting date, for day-roll tests
    pub fn next_business_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
    }

    /// A date before the seeded accounting day
    pub fn prior_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 13).unwrap()
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Creates a deterministic branch ID for testing
    pub fn branch_id() -> BranchId {
        BranchId::from_uuid(Uuid::parse_str("650e8400-e29b-41d4-a716-446655440001").unwrap())
    }

    /// Creates a deterministic teller ID for testing
    pub fn teller_id() -> TellerId {
        TellerId::from_uuid(Uuid::parse_str("650e8400-e29b-41d4-a716-446655440002").unwrap())
    }

    /// Creates a deterministic member ID for testing
    pub fn member_id() -> MemberId {
        MemberId::from_uuid(Uuid::parse_str("650e8400-e29b-41d4-a716-446655440003").unwrap())
    }

    /// Creates a deterministic account ID for testing
    pub fn account_id() -> AccountId {
        AccountId::from_uuid(Uuid::parse_str("650e8400-e29b-41d4-a716-446655440004").unwrap())
    }

    /// Creates a deterministic user ID for testing
    pub fn user_id() -> UserId {
        UserId::from_uuid(Uuid::parse_str("650e8400-e29b-41d4-a716-446655440005").unwrap())
    }
}

/// Fixture for counted cash
pub struct BreakdownFixtures;

impl BreakdownFixtures {
    /// A 500,000 TZS float counted as notes
    pub fn tzs_float_500k() -> CashBreakdown {
        CashBreakdown::new(Currency::TZS)
            .with(DenominationKind::Note, dec!(10000), 40)
            .with(DenominationKind::Note, dec!(5000), 20)
    }

    /// A 100,000 TZS drawer count with mixed notes and coins
    pub fn tzs_drawer_100k() -> CashBreakdown {
        CashBreakdown::new(Currency::TZS)
            .with(DenominationKind::Note, dec!(10000), 9)
            .with(DenominationKind::Note, dec!(5000), 1)
            .with(DenominationKind::Coin, dec!(500), 10)
    }

    /// Declares the whole amount as one note bundle
    pub fn bundle(amount: Money) -> CashBreakdown {
        CashBreakdown::new(amount.currency()).with(DenominationKind::Note, amount.amount(), 1)
    }
}

/// Fixture for member contact data
pub struct MemberFixtures;

impl MemberFixtures {
    /// A member with generated contact details
    pub fn info() -> MemberInfo {
        MemberInfo {
            id: MemberId::new(),
            name: Name().fake(),
            phone: Some(PhoneNumber().fake()),
        }
    }

    /// A member with a fixed name and no phone
    pub fn named(name: &str) -> MemberInfo {
        MemberInfo {
            id: MemberId::new(),
            name: name.to_string(),
            phone: None,
        }
    }
}

/// Fixture for approval payloads
pub struct PayloadFixtures;

impl PayloadFixtures {
    /// A none-cash credit of the given account
    pub fn none_cash_credit(account_id: AccountId, amount: Money) -> ApprovalPayload {
        ApprovalPayload::NoneCash {
            account_id,
            direction: PostingDirection::Credit,
            amount,
            narration: Some(StringFixtures::narration().to_string()),
        }
    }

    /// A none-cash debit of the given account
    pub fn none_cash_debit(account_id: AccountId, amount: Money) -> ApprovalPayload {
        ApprovalPayload::NoneCash {
            account_id,
            direction: PostingDirection::Debit,
            amount,
            narration: Some(StringFixtures::narration().to_string()),
        }
    }

    /// A reversal of the given posted reference
    pub fn reversal(reference: &TransactionReference) -> ApprovalPayload {
        ApprovalPayload::Reversal {
            original_reference: reference.clone(),
            reason: StringFixtures::reversal_reason().to_string(),
        }
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    /// Branch code embedded in reference numbers
    pub fn branch_code() -> &'static str {
        "001"
    }

    /// Code of a second branch for inter-branch tests
    pub fn other_branch_code() -> &'static str {
        "002"
    }

    /// Typical posting narration
    pub fn narration() -> &'static str {
        "school fees"
    }

    /// Typical reversal reason
    pub fn reversal_reason() -> &'static str {
        "posted against wrong account"
    }
}
