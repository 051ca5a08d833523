//! Supplier voucher flow.
//!
//! The voucher record itself belongs to the supplier-accounting collaborator;
//! the ledger observes only the capital movement (receipt credits, payment
//! debits) and, when the voucher names a consignment product, marks its sold
//! units settled in the same transaction.

use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{
    ApplyCmd, EntryRef, LedgerEntry, LedgerError, Product, ResultLedger, VoucherCmd, products,
};

use super::{Ledger, with_tx};

/// Result of posting a supplier voucher.
#[derive(Clone, Debug)]
pub struct VoucherOutcome {
    pub entry: LedgerEntry,
    /// Cost value of consignment sales this voucher settled (0 when the
    /// voucher named no product).
    pub settled_value_minor: i64,
}

impl Ledger {
    /// Posts a supplier receipt or payment against the vendor's capital.
    pub async fn record_voucher(&self, cmd: VoucherCmd) -> ResultLedger<VoucherOutcome> {
        with_tx!(self, |db_tx| {
            let mut settled_value_minor = 0;
            if let Some(product_id) = cmd.settles_product_id {
                let model = self
                    .require_product(&db_tx, &cmd.vendor_id, product_id)
                    .await?;
                let mut product = Product::try_from(model)?;
                if !product.is_consignment() {
                    return Err(LedgerError::InvalidAmount(format!(
                        "settlement requires a consignment product, {} is owned",
                        product.name
                    )));
                }
                settled_value_minor = product.settle_sold();
                let product_model = products::ActiveModel {
                    id: ActiveValue::Set(product.id.to_string()),
                    quantity_settled: ActiveValue::Set(product.quantity_settled),
                    ..Default::default()
                };
                product_model.update(&db_tx).await?;
            }

            let description = cmd
                .description
                .clone()
                .unwrap_or_else(|| format!("supplier voucher {}", cmd.voucher_id));
            let applied = self
                .apply_in_tx(
                    &db_tx,
                    &ApplyCmd::new(
                        cmd.vendor_id.clone(),
                        cmd.direction.entry_kind(),
                        cmd.amount_minor,
                    )
                    .description(description)
                    .reference(EntryRef::voucher(cmd.voucher_id.clone())),
                )
                .await?;

            Ok(VoucherOutcome {
                entry: applied.entry,
                settled_value_minor,
            })
        })
    }
}
