//! Money account resolution.
//!
//! Every transaction-creating operation needs the money account a payment
//! line lands in. The account is found by name: the method picks the class
//! prefix (cash or bank) and the currency completes it, e.g. `CASH UYU`.
//! There is no fallback and no auto-creation; a missing account fails the
//! enclosing transaction.

use crate::{
    config::AccountNaming,
    error::{AppError, AppResult},
    models::{account::MoneyAccount, payment::PaymentMethod},
    store::LedgerTx,
};

/// Synthesize the account name for a method and currency.
pub fn account_name(naming: &AccountNaming, method: PaymentMethod, currency: &str) -> String {
    let prefix = if naming.cash_methods.contains(&method) {
        &naming.cash_prefix
    } else {
        &naming.bank_prefix
    };
    format!("{prefix} {currency}")
}

/// Resolve the active money account for a method and currency.
///
/// # Errors
///
/// - `AccountNotFound`: no active account carries the synthesized name
/// - `Database`: the lookup failed
pub async fn resolve_account<T: LedgerTx>(
    tx: &mut T,
    naming: &AccountNaming,
    method: PaymentMethod,
    currency: &str,
) -> AppResult<MoneyAccount> {
    let name = account_name(naming, method, currency);

    tx.find_active_account_by_name(&name)
        .await?
        .ok_or(AppError::AccountNotFound { name })
}
