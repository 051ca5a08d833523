//! Read-side inventory valuation.

use sea_orm::{ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};

use crate::{Product, ResultLedger, products};

use super::{Ledger, with_tx};

/// Capital value currently tied up in a vendor's inventory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InventoryValuation {
    /// `Σ unit_cost × on_hand` over active owned products. This value already
    /// left the account at purchase time; it is capital in the warehouse.
    pub owned_stock_value_minor: i64,
    /// `Σ unit_cost × on_hand` over active consignment products.
    /// Informational only: it was never paid from capital.
    pub consignment_stock_value_minor: i64,
    /// Cost basis of sold consignment units not yet settled by a supplier
    /// voucher: a pending payable. Archived rows are included, since
    /// archiving stock does not forgive the debt.
    pub consignment_sold_unsettled_value_minor: i64,
}

impl InventoryValuation {
    pub(super) fn from_products(products: &[Product]) -> Self {
        let mut valuation = Self::default();
        for product in products {
            if !product.archived {
                if product.is_owned() {
                    valuation.owned_stock_value_minor += product.stock_value_minor();
                } else {
                    valuation.consignment_stock_value_minor += product.stock_value_minor();
                }
            }
            valuation.consignment_sold_unsettled_value_minor +=
                product.unsettled_sold_value_minor();
        }
        valuation
    }
}

impl Ledger {
    pub(super) async fn load_products<C>(&self, db: &C, vendor_id: &str) -> ResultLedger<Vec<Product>>
    where
        C: ConnectionTrait,
    {
        let models = products::Entity::find()
            .filter(products::Column::VendorId.eq(vendor_id.to_string()))
            .all(db)
            .await?;
        models.into_iter().map(Product::try_from).collect()
    }

    /// Computes the vendor's inventory valuation from a single consistent
    /// snapshot. Read-only; safe to call concurrently with writes.
    pub async fn valuation(&self, vendor_id: &str) -> ResultLedger<InventoryValuation> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, vendor_id).await?;
            let products = self.load_products(&db_tx, vendor_id).await?;
            Ok(InventoryValuation::from_products(&products))
        })
    }
}
