use sea_orm::DatabaseConnection;
use unicode_normalization::UnicodeNormalization;

use crate::{LedgerError, ResultLedger};

mod accounts;
mod apply;
mod entries;
mod products;
mod purchases;
mod reconcile;
mod sales;
mod valuation;
mod vendors;
mod vouchers;

pub use apply::{Applied, InsufficientCapital};
pub use entries::EntryListFilter;
pub use products::ArchiveOutcome;
pub use purchases::PurchaseOutcome;
pub use reconcile::{DriftExplanation, RECONCILE_EPSILON_MINOR, ReconcileReport};
pub use sales::SaleOutcome;
pub use valuation::InventoryValuation;
pub use vouchers::VoucherOutcome;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Handle to the vendor capital ledger.
///
/// The only component allowed to mutate `capital_accounts`; every mutation
/// writes its ledger entry and the balance update in one transaction.
#[derive(Debug)]
pub struct Ledger {
    database: DatabaseConnection,
}

impl Ledger {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultLedger<String> {
    let normalized: String = value.nfc().collect();
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidAmount(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// The builder for `Ledger`
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
}

impl LedgerBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Construct `Ledger`
    pub async fn build(self) -> ResultLedger<Ledger> {
        Ok(Ledger {
            database: self.database,
        })
    }
}
