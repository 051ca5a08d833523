//! Errors the ledger can return.
//!
//! Insufficient capital is deliberately *not* here: a purchase that overdraws
//! the account still commits and surfaces a warning value instead (see
//! [`InsufficientCapital`]). Only conditions that abort the call are errors.
//!
//! [`InsufficientCapital`]: crate::InsufficientCapital
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The vendor has no capital account yet (onboarding incomplete).
    #[error("no capital account for vendor \"{0}\"")]
    AccountNotFound(String),
    /// The vendor already has a capital account; `initial_capital` is set once.
    #[error("capital account for vendor \"{0}\" already exists")]
    AccountExists(String),
    /// An entry with the same `(vendor, kind, reference)` was already posted.
    #[error("duplicate reference: {0}")]
    DuplicateReference(String),
    #[error("\"{0}\" not found")]
    KeyNotFound(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("insufficient stock: {0}")]
    InsufficientStock(String),
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
    /// The guarded balance update lost a race; nothing was committed.
    /// Safe to retry with the same reference.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::AccountNotFound(a), Self::AccountNotFound(b)) => a == b,
            (Self::AccountExists(a), Self::AccountExists(b)) => a == b,
            (Self::DuplicateReference(a), Self::DuplicateReference(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InsufficientStock(a), Self::InsufficientStock(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
