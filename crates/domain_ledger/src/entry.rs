//! Planned ledger entries
//!
//! An orchestrated operation stages its balance mutations as a
//! [`LedgerEntry`]: a set of legs built in matched debit/credit pairs.
//! Validation re-checks what construction already guarantees, because the
//! zero-sum invariant is load-bearing: a set that does not net to zero is a
//! recipe defect and must never reach the store.

use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, Currency, LegRole, Money, PostingDirection};

use crate::error::LedgerError;
use crate::record::TransactionRecord;

/// One staged balance mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedLeg {
    /// Account to mutate
    pub account_id: AccountId,
    /// Direction of the mutation
    pub direction: PostingDirection,
    /// Magnitude (strictly positive)
    pub amount: Money,
    /// Role within the operation
    pub role: LegRole,
}

/// The full leg set of one orchestrated operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    currency: Currency,
    legs: Vec<PlannedLeg>,
}

impl LedgerEntry {
    /// Creates an empty entry in the given currency
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            legs: Vec::new(),
        }
    }

    /// Adds a matched debit/credit pair of equal magnitude
    pub fn pair(
        mut self,
        debit_account: AccountId,
        credit_account: AccountId,
        amount: Money,
        role: LegRole,
    ) -> Self {
        self.legs.push(PlannedLeg {
            account_id: debit_account,
            direction: PostingDirection::Debit,
            amount,
            role,
        });
        self.legs.push(PlannedLeg {
            account_id: credit_account,
            direction: PostingDirection::Credit,
            amount,
            role,
        });
        self
    }

    /// Builds the compensating entry for previously posted legs
    ///
    /// Every leg keeps its account, amount and role but flips direction, so
    /// a set that netted to zero mirrors into a set that nets to zero.
    pub fn mirror(currency: Currency, originals: &[TransactionRecord]) -> Self {
        let legs = originals
            .iter()
            .map(|record| PlannedLeg {
                account_id: record.account_id,
                direction: record.direction.opposite(),
                amount: record.amount,
                role: record.role,
            })
            .collect();
        Self { currency, legs }
    }

    /// Returns the staged legs
    pub fn legs(&self) -> &[PlannedLeg] {
        &self.legs
    }

    /// Returns the entry currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if no legs are staged
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Sum of debit magnitudes
    pub fn total_debits(&self) -> Money {
        self.total_for(PostingDirection::Debit)
    }

    /// Sum of credit magnitudes
    pub fn total_credits(&self) -> Money {
        self.total_for(PostingDirection::Credit)
    }

    fn total_for(&self, direction: PostingDirection) -> Money {
        self.legs
            .iter()
            .filter(|leg| leg.direction == direction)
            .fold(Money::zero(self.currency), |acc, leg| acc + leg.amount)
    }

    /// Validates the entry before staging
    ///
    /// Checks: at least one leg, every amount strictly positive and in the
    /// entry currency, and signed amounts netting to zero.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.legs.is_empty() {
            return Err(LedgerError::EmptyEntry);
        }

        for leg in &self.legs {
            if !leg.amount.is_positive() {
                return Err(LedgerError::InvalidAmount(format!(
                    "leg on {} must be strictly positive, got {}",
                    leg.account_id,
                    leg.amount.amount()
                )));
            }
            if leg.amount.currency() != self.currency {
                // Forces the mismatch error with both currencies named
                Money::zero(self.currency).checked_add(&leg.amount)?;
            }
        }

        let debits = self.total_debits();
        let credits = self.total_credits();
        if debits != credits {
            return Err(LedgerError::UnbalancedEntry {
                debits: debits.amount(),
                credits: credits.amount(),
            });
        }

        Ok(())
    }
}
