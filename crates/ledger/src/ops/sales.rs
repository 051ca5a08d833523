//! Sale recording flow.

use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::util::checked_total;
use crate::{
    ApplyCmd, EntryKind, EntryRef, LedgerEntry, LedgerError, Product, ResultLedger, SaleCmd,
    products,
};

use super::{Ledger, with_tx};

/// Result of recording a sale.
#[derive(Clone, Debug)]
pub struct SaleOutcome {
    pub product_id: Uuid,
    pub quantity: i64,
    /// Margin credited to capital. 0 for consignment sales, whose margin is
    /// realized only when a supplier voucher is posted.
    pub profit_minor: i64,
    pub entry: Option<LedgerEntry>,
}

impl Ledger {
    /// Records a sale of `quantity` units.
    ///
    /// Owned stock credits the account with `(unit_price − unit_cost) ×
    /// quantity`: the margin, not the full sale price. Consignment stock
    /// moves inventory only; posting profit for it at sale time is exactly
    /// the drift bug reconciliation hunts for.
    pub async fn record_sale(&self, cmd: SaleCmd) -> ResultLedger<SaleOutcome> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_product(&db_tx, &cmd.vendor_id, cmd.product_id)
                .await?;
            let mut product = Product::try_from(model)?;
            if product.archived {
                return Err(LedgerError::InvalidAmount(format!(
                    "product {} is archived",
                    product.name
                )));
            }

            product.sell(cmd.quantity)?;

            let (profit_minor, entry) = if product.is_owned() {
                let margin_minor = cmd.unit_price_minor - product.unit_cost_minor;
                if margin_minor < 0 {
                    return Err(LedgerError::InvalidAmount(format!(
                        "selling price below unit cost for {}",
                        product.name
                    )));
                }
                let profit = checked_total(margin_minor, cmd.quantity)?;
                if profit > 0 {
                    let description = cmd.description.clone().unwrap_or_else(|| {
                        format!("sale margin: {} x{}", product.name, cmd.quantity)
                    });
                    let applied = self
                        .apply_in_tx(
                            &db_tx,
                            &ApplyCmd::new(cmd.vendor_id.clone(), EntryKind::SaleProfit, profit)
                                .description(description)
                                .reference(EntryRef::sale(cmd.sale_id.clone())),
                        )
                        .await?;
                    (profit, Some(applied.entry))
                } else {
                    (0, None)
                }
            } else {
                // Consignment: inventory moves, capital does not. The cost of
                // the sold units becomes an unsettled payable.
                self.require_account(&db_tx, &cmd.vendor_id).await?;
                (0, None)
            };

            let product_model = products::ActiveModel {
                id: ActiveValue::Set(product.id.to_string()),
                quantity_on_hand: ActiveValue::Set(product.quantity_on_hand),
                quantity_sold: ActiveValue::Set(product.quantity_sold),
                ..Default::default()
            };
            product_model.update(&db_tx).await?;

            Ok(SaleOutcome {
                product_id: product.id,
                quantity: cmd.quantity,
                profit_minor,
                entry,
            })
        })
    }
}
