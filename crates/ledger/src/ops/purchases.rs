//! Purchase recording flow.

use chrono::Utc;
use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::util::checked_total;
use crate::{
    ApplyCmd, EntryKind, EntryRef, LedgerEntry, Product, PurchaseCmd, ResultLedger, SourceType,
    products,
};

use super::{Ledger, apply::InsufficientCapital, normalize_required_name, with_tx};

/// Result of recording a purchase.
#[derive(Clone, Debug)]
pub struct PurchaseOutcome {
    pub product_id: Uuid,
    /// `None` for consignment stock, which never touches capital.
    pub entry: Option<LedgerEntry>,
    /// Present when the purchase overdrew the account. The purchase still
    /// committed; this is for the caller to display.
    pub warning: Option<InsufficientCapital>,
}

impl Ledger {
    /// Records a stock purchase as a new product batch.
    ///
    /// Owned stock debits the account with `unit_cost × quantity`; the debit
    /// goes through even if the balance turns negative (insufficient capital
    /// is a warning in the outcome, never a blocking error). Consignment
    /// stock creates the batch row only: the vendor does not own it, so no
    /// ledger entry is written.
    pub async fn record_purchase(&self, cmd: PurchaseCmd) -> ResultLedger<PurchaseOutcome> {
        let name = normalize_required_name(&cmd.name, "product")?;

        with_tx!(self, |db_tx| {
            self.require_vendor(&db_tx, &cmd.vendor_id).await?;
            self.require_account(&db_tx, &cmd.vendor_id).await?;

            let product = Product::new(
                cmd.vendor_id.clone(),
                name.clone(),
                cmd.source,
                cmd.unit_cost_minor,
                cmd.quantity,
                Utc::now(),
            )?;
            products::ActiveModel::from(&product).insert(&db_tx).await?;

            match cmd.source {
                SourceType::Owned => {
                    let total = checked_total(cmd.unit_cost_minor, cmd.quantity)?;
                    let description = cmd
                        .description
                        .clone()
                        .unwrap_or_else(|| format!("stock purchase: {name} x{}", cmd.quantity));
                    let applied = self
                        .apply_in_tx(
                            &db_tx,
                            &ApplyCmd::new(cmd.vendor_id.clone(), EntryKind::Purchase, total)
                                .description(description)
                                .reference(EntryRef::product(product.id)),
                        )
                        .await?;
                    Ok(PurchaseOutcome {
                        product_id: product.id,
                        entry: Some(applied.entry),
                        warning: applied.warning,
                    })
                }
                SourceType::Consignment => Ok(PurchaseOutcome {
                    product_id: product.id,
                    entry: None,
                    warning: None,
                }),
            }
        })
    }
}
