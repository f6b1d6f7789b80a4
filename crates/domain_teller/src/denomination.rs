//! Cash denomination breakdowns
//!
//! Every movement of physical cash is declared as notes and coins. The
//! breakdown must add up to the declared amount before a till accepts it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money};

use crate::error::TellerError;

/// Physical form of a denomination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenominationKind {
    Note,
    Coin,
}

/// A single denomination row: so many pieces of one face value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenominationCount {
    /// Note or coin
    pub kind: DenominationKind,
    /// Face value of one piece
    pub face_value: Decimal,
    /// Number of pieces
    pub count: u32,
}

impl DenominationCount {
    pub fn new(kind: DenominationKind, face_value: Decimal, count: u32) -> Self {
        Self {
            kind,
            face_value,
            count,
        }
    }

    /// Value contributed by this row
    pub fn subtotal(&self) -> Decimal {
        self.face_value * Decimal::from(self.count)
    }
}

/// A counted stack of cash in one currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashBreakdown {
    pub currency: Currency,
    pub denominations: Vec<DenominationCount>,
}

impl CashBreakdown {
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            denominations: Vec::new(),
        }
    }

    /// Adds a denomination row, merging with an existing row of the same
    /// kind and face value.
    pub fn add(&mut self, kind: DenominationKind, face_value: Decimal, count: u32) {
        if let Some(row) = self
            .denominations
            .iter_mut()
            .find(|r| r.kind == kind && r.face_value == face_value)
        {
            row.count += count;
        } else {
            self.denominations
                .push(DenominationCount::new(kind, face_value, count));
        }
    }

    /// Builder-style variant of [`add`](Self::add)
    pub fn with(mut self, kind: DenominationKind, face_value: Decimal, count: u32) -> Self {
        self.add(kind, face_value, count);
        self
    }

    /// Checks every row is usable: positive face value expressible in the
    /// currency, and a non-zero count.
    pub fn validate(&self) -> Result<(), TellerError> {
        for row in &self.denominations {
            if row.face_value <= Decimal::ZERO {
                return Err(TellerError::InvalidDenomination(format!(
                    "face value {} must be positive",
                    row.face_value
                )));
            }
            if row.count == 0 {
                return Err(TellerError::InvalidDenomination(format!(
                    "count for face value {} must be non-zero",
                    row.face_value
                )));
            }
            Money::exact(row.face_value, self.currency)
                .map_err(|e| TellerError::InvalidDenomination(e.to_string()))?;
        }
        Ok(())
    }

    /// Total value of the breakdown
    pub fn total(&self) -> Decimal {
        self.denominations.iter().map(DenominationCount::subtotal).sum()
    }

    /// Validates the rows and checks they add up to the declared amount
    pub fn verify_against(&self, declared: &Money) -> Result<(), TellerError> {
        self.validate()?;
        let counted = self.total();
        if self.currency != declared.currency() || counted != declared.amount() {
            return Err(TellerError::DenominationMismatch {
                declared: declared.amount(),
                counted,
            });
        }
        Ok(())
    }

    /// Folds another breakdown into this one, row by row. Used when a
    /// replenishment lands on top of the cash already in the drawer.
    pub fn merge(&mut self, other: &CashBreakdown) {
        for row in &other.denominations {
            self.add(row.kind, row.face_value, row.count);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.denominations.is_empty()
    }
}
