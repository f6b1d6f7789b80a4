//! Operation charges
//!
//! Fees and VAT are derived here and nowhere else: this is the single point
//! where rounding (half away from zero, at the currency's precision) is
//! applied. Posting code receives already-rounded charge amounts. Rates and
//! the VAT exemption threshold arrive from configuration.

use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, OperationType, Rate};

/// Charge rates and thresholds for a branch network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeSchedule {
    /// Fee rate applied to cash withdrawals
    pub withdrawal_fee: Rate,
    /// Fee rate applied to remittance funding
    pub remittance_fee: Rate,
    /// VAT rate applied on fees
    pub vat: Rate,
    /// Operation amounts at or below this are VAT-exempt
    pub vat_exemption_threshold: Option<Money>,
}

impl ChargeSchedule {
    /// A schedule that charges nothing
    pub fn free() -> Self {
        Self {
            withdrawal_fee: Rate::new(rust_decimal::Decimal::ZERO),
            remittance_fee: Rate::new(rust_decimal::Decimal::ZERO),
            vat: Rate::new(rust_decimal::Decimal::ZERO),
            vat_exemption_threshold: None,
        }
    }

    /// Computes the charges for an operation amount
    pub fn charges_for(&self, operation: OperationType, amount: &Money) -> Charges {
        let currency = amount.currency();
        let dp = currency.decimal_places();

        let fee_rate = match operation {
            OperationType::CashWithdrawal => Some(self.withdrawal_fee),
            OperationType::RemittanceFunding => Some(self.remittance_fee),
            _ => None,
        };

        let fee = match fee_rate {
            Some(rate) => rate.apply(amount).round_half_away(dp),
            None => Money::zero(currency),
        };

        let vat = if fee.is_positive() && self.vat_applies(amount) {
            self.vat.apply(&fee).round_half_away(dp)
        } else {
            Money::zero(currency)
        };

        Charges { fee, tax: vat }
    }

    fn vat_applies(&self, amount: &Money) -> bool {
        match &self.vat_exemption_threshold {
            Some(threshold) => amount.amount() > threshold.amount(),
            None => true,
        }
    }
}

/// Derived charges for one operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Charges {
    /// Fee on the operation amount
    pub fee: Money,
    /// VAT on the fee
    pub tax: Money,
}

impl Charges {
    /// No charges, in the given currency
    pub fn none(currency: Currency) -> Self {
        Self {
            fee: Money::zero(currency),
            tax: Money::zero(currency),
        }
    }

    /// Fee plus VAT
    pub fn total(&self) -> Money {
        self.fee + self.tax
    }

    /// Returns true if neither fee nor VAT applies
    pub fn is_free(&self) -> bool {
        self.fee.is_zero() && self.tax.is_zero()
    }
}
