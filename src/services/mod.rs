//! Business logic services.
//!
//! Services contain the ledger engine, separated from HTTP handlers. Every
//! mutating operation opens exactly one store transaction and either commits
//! it or rolls it back before returning.

/// Payment method + currency to money account
pub mod account_resolver;
/// Financial adjustments and adjustment types
pub mod adjustment_service;
/// Pure DIRECT/FIFO allocation
pub mod allocation;
/// Obligations created together with their initial payments
pub mod batch_service;
/// Transfers and currency exchanges between accounts
pub mod exchange_service;
/// Obligation status and outstanding debt
pub mod ledger_reader;
/// RegisterPayment coordinator
pub mod payment_service;
