//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the ledger enforces consistent invariants.

use crate::{Currency, LedgerError, ResultLedger};

/// Parse a currency code stored in the DB into a strongly typed `Currency`.
pub(crate) fn model_currency(value: &str) -> ResultLedger<Currency> {
    Currency::try_from(value)
        .map_err(|_| LedgerError::InvalidAmount(format!("invalid currency: {value}")))
}

/// Multiply a unit amount by a quantity with overflow checking.
pub(crate) fn checked_total(unit_minor: i64, quantity: i64) -> ResultLedger<i64> {
    unit_minor
        .checked_mul(quantity)
        .ok_or_else(|| LedgerError::InvalidAmount("amount too large".to_string()))
}
