//! Engine configuration
//!
//! Defaults cover a development setup; any field can be overridden through
//! `CBS_`-prefixed environment variables, e.g. `CBS_VAT_RATE=0.20`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, Rate};
use domain_ledger::ChargeSchedule;

/// Configuration for the posting engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Operating currency of the branch network
    pub currency: Currency,
    /// Fee rate applied to cash withdrawals
    pub withdrawal_fee_rate: Decimal,
    /// Fee rate applied to remittance funding
    pub remittance_fee_rate: Decimal,
    /// VAT rate applied on fees
    pub vat_rate: Decimal,
    /// Amounts at or below this are VAT exempt; absent means always taxed
    pub vat_exemption_threshold: Option<Decimal>,
    /// Attempts for postings that lose an optimistic version race
    pub max_posting_retries: u32,
    /// Base backoff between retry attempts, in milliseconds
    pub retry_backoff_ms: u64,
    /// Send member posting notices after commit
    pub notifications_enabled: bool,
    /// Log level
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            currency: Currency::TZS,
            withdrawal_fee_rate: dec!(0.005),
            remittance_fee_rate: dec!(0.01),
            vat_rate: dec!(0.18),
            vat_exemption_threshold: Some(dec!(10000)),
            max_posting_retries: 3,
            retry_backoff_ms: 20,
            notifications_enabled: true,
            log_level: "info".to_string(),
        }
    }
}

impl CoreConfig {
    /// Loads configuration from the environment on top of the defaults.
    ///
    /// A `.env` file is honored when present.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        config::Config::builder()
            .add_source(config::Config::try_from(&CoreConfig::default())?)
            .add_source(config::Environment::with_prefix("CBS"))
            .build()?
            .try_deserialize()
    }

    /// Builds the charge schedule the orchestrator prices operations with
    pub fn charge_schedule(&self) -> ChargeSchedule {
        ChargeSchedule {
            withdrawal_fee: Rate::new(self.withdrawal_fee_rate),
            remittance_fee: Rate::new(self.remittance_fee_rate),
            vat: Rate::new(self.vat_rate),
            vat_exemption_threshold: self
                .vat_exemption_threshold
                .map(|amount| Money::new(amount, self.currency)),
        }
    }
}
