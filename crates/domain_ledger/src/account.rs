//! Accounts and balance mutation primitives
//!
//! Every account keeps its current balance and the balance it had before
//! the last mutation. The debit/credit primitives are the only way balances
//! move; both snapshot `previous_balance` before applying the exact amount
//! passed, so `balance = previous_balance ± amount` always holds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{AccountId, BranchId, Currency, MemberId, Money, MoneyError, TellerId};

use crate::error::LedgerError;

/// Well-known general-ledger accounts the posting recipes touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlKind {
    /// Branch vault; counter-account for drawer cash custody
    BranchVault,
    /// Settlement counter-account for claim legs of cash and book entries
    CashSettlement,
    /// Fee income
    FeeIncome,
    /// VAT collected, owed to the revenue authority
    VatPayable,
    /// Funded remittances awaiting payout
    RemittancePayable,
}

impl GlKind {
    /// Returns the ledger code used in statements and seeds
    pub fn code(&self) -> &'static str {
        match self {
            GlKind::BranchVault => "101",
            GlKind::CashSettlement => "102",
            GlKind::FeeIncome => "401",
            GlKind::VatPayable => "402",
            GlKind::RemittancePayable => "201",
        }
    }
}

impl fmt::Display for GlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GL-{}", self.code())
    }
}

/// Who an account belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountHolder {
    /// A member's deposit account
    Member(MemberId),
    /// A teller's till account tracking drawer cash
    Teller(TellerId),
    /// A branch general-ledger position
    GeneralLedger(GlKind),
}

/// Minimum-balance policy applied on debits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinimumBalance {
    /// Balance may not drop below this floor
    Floor(Money),
    /// No floor; the balance may go arbitrarily negative
    Unbounded,
}

/// An account in the posting ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,
    /// Owner of the account
    pub holder: AccountHolder,
    /// Branch the account is domiciled in
    pub branch_id: BranchId,
    /// Current balance
    pub balance: Money,
    /// Balance before the last mutation
    pub previous_balance: Money,
    /// Floor applied on debits
    pub minimum_balance: MinimumBalance,
    /// Inactive accounts refuse mutation
    pub active: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates an account with an explicit floor
    pub fn new(
        holder: AccountHolder,
        branch_id: BranchId,
        currency: Currency,
        minimum_balance: MinimumBalance,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new_v7(),
            holder,
            branch_id,
            balance: Money::zero(currency),
            previous_balance: Money::zero(currency),
            minimum_balance,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a member deposit account with a zero floor
    pub fn member(member_id: MemberId, branch_id: BranchId, currency: Currency) -> Self {
        Self::new(
            AccountHolder::Member(member_id),
            branch_id,
            currency,
            MinimumBalance::Floor(Money::zero(currency)),
        )
    }

    /// Creates a till account for a teller
    ///
    /// Drawer cash cannot go negative, so tills carry a zero floor.
    pub fn till(teller_id: TellerId, branch_id: BranchId, currency: Currency) -> Self {
        Self::new(
            AccountHolder::Teller(teller_id),
            branch_id,
            currency,
            MinimumBalance::Floor(Money::zero(currency)),
        )
    }

    /// Creates a general-ledger position account with no floor
    pub fn general_ledger(kind: GlKind, branch_id: BranchId, currency: Currency) -> Self {
        Self::new(
            AccountHolder::GeneralLedger(kind),
            branch_id,
            currency,
            MinimumBalance::Unbounded,
        )
    }

    /// Returns the account currency
    pub fn currency(&self) -> Currency {
        self.balance.currency()
    }

    /// Returns the balance available above the floor
    pub fn available(&self) -> Money {
        match self.minimum_balance {
            MinimumBalance::Floor(floor) => self.balance - floor,
            MinimumBalance::Unbounded => self.balance,
        }
    }

    /// Returns true if a debit of `amount` would stay at or above the floor
    pub fn can_debit(&self, amount: &Money) -> bool {
        match self.minimum_balance {
            MinimumBalance::Floor(floor) => {
                (self.balance - *amount).amount() >= floor.amount()
            }
            MinimumBalance::Unbounded => true,
        }
    }

    /// Decreases the balance by the exact amount passed
    ///
    /// Snapshots `previous_balance` first. Fails if the account is inactive,
    /// the amount is negative or mismatched in currency, or the resulting
    /// balance would cross the minimum-balance floor.
    pub fn debit(&mut self, amount: &Money) -> Result<(), LedgerError> {
        self.check_mutable(amount)?;
        if !self.can_debit(amount) {
            let minimum = match self.minimum_balance {
                MinimumBalance::Floor(floor) => floor.amount(),
                MinimumBalance::Unbounded => unreachable!("unbounded floor cannot reject"),
            };
            return Err(LedgerError::InsufficientFunds {
                account: self.id.to_string(),
                balance: self.balance.amount(),
                requested: amount.amount(),
                minimum,
            });
        }
        let new_balance = self.balance.checked_sub(amount)?;
        self.apply(new_balance);
        Ok(())
    }

    /// Increases the balance by the exact amount passed
    ///
    /// Snapshots `previous_balance` first.
    pub fn credit(&mut self, amount: &Money) -> Result<(), LedgerError> {
        self.check_mutable(amount)?;
        let new_balance = self.balance.checked_add(amount)?;
        self.apply(new_balance);
        Ok(())
    }

    /// Sets the balance outright, keeping the previous-balance snapshot
    ///
    /// Used by till provisioning, where the opening amount is authoritative
    /// for the receiving till.
    pub fn set_balance(&mut self, to: Money) -> Result<(), LedgerError> {
        if !self.active {
            return Err(LedgerError::InactiveAccount(self.id.to_string()));
        }
        if to.currency() != self.currency() {
            return Err(MoneyError::CurrencyMismatch(
                self.currency().to_string(),
                to.currency().to_string(),
            )
            .into());
        }
        self.apply(to);
        Ok(())
    }

    fn check_mutable(&self, amount: &Money) -> Result<(), LedgerError> {
        if !self.active {
            return Err(LedgerError::InactiveAccount(self.id.to_string()));
        }
        if amount.is_negative() {
            return Err(LedgerError::InvalidAmount(format!(
                "posting amounts must be non-negative, got {}",
                amount.amount()
            )));
        }
        Ok(())
    }

    fn apply(&mut self, new_balance: Money) {
        self.previous_balance = self.balance;
        self.balance = new_balance;
        self.updated_at = Utc::now();
    }
}
