//! Vendor capital ledger.
//!
//! One running-balance capital account per vendor, an append-only entry log,
//! and a read-only reconciliation path that re-derives the balance from
//! inventory and the entry log. All balance mutations go through the
//! [`Ledger`] handle; nothing else writes `capital_accounts`.

pub use accounts::CapitalAccount;
pub use commands::{
    ApplyCmd, ArchiveProductCmd, OpenAccountCmd, PurchaseCmd, SaleCmd, VoucherCmd,
    VoucherDirection,
};
pub use currency::Currency;
pub use entries::{EntryKind, EntryRef, LedgerEntry, RefKind};
pub use error::LedgerError;
pub use money::MoneyCents;
pub use ops::{
    Applied, ArchiveOutcome, DriftExplanation, EntryListFilter, InsufficientCapital,
    InventoryValuation, Ledger, LedgerBuilder, PurchaseOutcome, RECONCILE_EPSILON_MINOR,
    ReconcileReport, SaleOutcome, VoucherOutcome,
};
pub use products::{Product, SourceType};
pub use vendors::Vendor;

mod accounts;
mod commands;
mod currency;
mod entries;
mod error;
mod money;
mod ops;
mod products;
mod util;
mod vendors;

type ResultLedger<T> = Result<T, LedgerError>;
