//! Product archival (the deletion flow) and product reads.

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    ApplyCmd, ArchiveProductCmd, EntryKind, EntryRef, LedgerEntry, LedgerError, Product,
    ResultLedger, products,
};

use super::{Ledger, with_tx};

/// Result of archiving a product.
#[derive(Clone, Debug)]
pub struct ArchiveOutcome {
    pub product_id: Uuid,
    /// Value of unsold owned stock returned to capital; 0 for consignment.
    pub refunded_minor: i64,
    pub entry: Option<LedgerEntry>,
}

impl Ledger {
    pub(super) async fn require_product(
        &self,
        db: &DatabaseTransaction,
        vendor_id: &str,
        product_id: Uuid,
    ) -> ResultLedger<products::Model> {
        products::Entity::find_by_id(product_id.to_string())
            .filter(products::Column::VendorId.eq(vendor_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("product not exists".to_string()))
    }

    /// Archives a product (the marketplace "delete product" flow).
    ///
    /// Owned stock with units left posts a `refund` of `unit_cost × on_hand`
    /// in the same transaction that archives the row, so the row is never
    /// gone while the refund is uncommitted. Consignment stock archives
    /// without touching capital; an unsettled payable on it survives until a
    /// voucher clears it.
    pub async fn archive_product(&self, cmd: ArchiveProductCmd) -> ResultLedger<ArchiveOutcome> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_product(&db_tx, &cmd.vendor_id, cmd.product_id)
                .await?;
            let mut product = Product::try_from(model)?;
            if product.archived {
                return Err(LedgerError::InvalidAmount(format!(
                    "product {} already archived",
                    product.name
                )));
            }

            let remaining_minor = product.archive();
            let entry = if product.is_owned() && remaining_minor > 0 {
                let applied = self
                    .apply_in_tx(
                        &db_tx,
                        &ApplyCmd::new(cmd.vendor_id.clone(), EntryKind::Refund, remaining_minor)
                            .description(format!("stock refund on archive: {}", product.name))
                            .reference(EntryRef::product(product.id)),
                    )
                    .await?;
                Some(applied.entry)
            } else {
                None
            };

            let refunded_minor = if product.is_owned() { remaining_minor } else { 0 };
            let product_model = products::ActiveModel {
                id: ActiveValue::Set(product.id.to_string()),
                quantity_on_hand: ActiveValue::Set(0),
                archived: ActiveValue::Set(true),
                ..Default::default()
            };
            product_model.update(&db_tx).await?;

            Ok(ArchiveOutcome {
                product_id: product.id,
                refunded_minor,
                entry,
            })
        })
    }

    /// Snapshot of one product row.
    pub async fn product(&self, vendor_id: &str, product_id: Uuid) -> ResultLedger<Product> {
        let model = products::Entity::find_by_id(product_id.to_string())
            .filter(products::Column::VendorId.eq(vendor_id.to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("product not exists".to_string()))?;
        Product::try_from(model)
    }
}
