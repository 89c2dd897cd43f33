//! Application configuration management.
//!
//! Configuration is read from environment variables with `envy`. The ledger
//! rules that used to be process-wide constants (supported currencies, the
//! account naming convention) are part of it and are handed to every engine
//! operation as a `LedgerSettings` value.

use serde::Deserialize;

use crate::models::payment::PaymentMethod;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DB_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `LOCAL_CURRENCY` / `FOREIGN_CURRENCY` (optional): defaults UYU / USD
/// - `CASH_ACCOUNT_PREFIX` / `BANK_ACCOUNT_PREFIX` (optional): defaults CASH / BANK
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_local_currency")]
    pub local_currency: String,

    #[serde(default = "default_foreign_currency")]
    pub foreign_currency: String,

    #[serde(default = "default_cash_prefix")]
    pub cash_account_prefix: String,

    #[serde(default = "default_bank_prefix")]
    pub bank_account_prefix: String,
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

fn default_local_currency() -> String {
    "UYU".to_string()
}

fn default_foreign_currency() -> String {
    "USD".to_string()
}

fn default_cash_prefix() -> String {
    "CASH".to_string()
}

fn default_bank_prefix() -> String {
    "BANK".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is loaded first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a value cannot be
    /// parsed into its field type.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>()
    }

    /// Ledger rules derived from this configuration.
    pub fn ledger_settings(&self) -> LedgerSettings {
        LedgerSettings {
            local_currency: self.local_currency.to_uppercase(),
            foreign_currency: self.foreign_currency.to_uppercase(),
            accounts: AccountNaming {
                cash_prefix: self.cash_account_prefix.clone(),
                bank_prefix: self.bank_account_prefix.clone(),
                cash_methods: vec![PaymentMethod::Cash],
            },
        }
    }
}

/// Rules injected into the ledger engine.
///
/// Only two currencies exist: a local one and a foreign one. Exchanges
/// between them use an operator-supplied factor expressed as units of local
/// currency per unit of foreign currency.
#[derive(Debug, Clone)]
pub struct LedgerSettings {
    pub local_currency: String,
    pub foreign_currency: String,
    pub accounts: AccountNaming,
}

/// Naming convention that maps a payment method and currency onto a money
/// account, e.g. `CASH UYU` or `BANK USD`.
#[derive(Debug, Clone)]
pub struct AccountNaming {
    pub cash_prefix: String,
    pub bank_prefix: String,
    /// Methods settled in the cash account; everything else goes to the bank.
    pub cash_methods: Vec<PaymentMethod>,
}

impl LedgerSettings {
    pub fn supports_currency(&self, currency: &str) -> bool {
        currency == self.local_currency || currency == self.foreign_currency
    }

    /// Validation message for an unsupported currency, `None` when supported.
    pub fn check_currency(&self, field: &str, currency: &str) -> Option<String> {
        if self.supports_currency(currency) {
            None
        } else {
            Some(format!(
                "{field} must be {} or {}",
                self.local_currency, self.foreign_currency
            ))
        }
    }
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            local_currency: default_local_currency(),
            foreign_currency: default_foreign_currency(),
            accounts: AccountNaming {
                cash_prefix: default_cash_prefix(),
                bank_prefix: default_bank_prefix(),
                cash_methods: vec![PaymentMethod::Cash],
            },
        }
    }
}
