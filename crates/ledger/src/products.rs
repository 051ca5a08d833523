//! Inventory batch rows.
//!
//! Every purchase creates one product row with a fixed unit cost; restocking
//! is a new batch. Rows are archived, never deleted, because reconciliation
//! keeps re-deriving cost history from sold quantities after the stock is
//! gone.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, ResultLedger};

/// Who paid for the stock.
///
/// `Owned` stock was bought with the vendor's own capital (cost deducted at
/// purchase time). `Consignment` stock belongs to a supplier and never
/// touches capital until a voucher settles the sold units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Owned,
    Consignment,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owned => "owned",
            Self::Consignment => "consignment",
        }
    }
}

impl TryFrom<&str> for SourceType {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "owned" => Ok(Self::Owned),
            "consignment" => Ok(Self::Consignment),
            other => Err(LedgerError::InvalidAmount(format!(
                "invalid source type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub vendor_id: String,
    pub name: String,
    pub source_type: SourceType,
    pub unit_cost_minor: i64,
    pub quantity_on_hand: i64,
    pub quantity_sold: i64,
    /// Consignment units whose supplier voucher has been posted.
    pub quantity_settled: i64,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        vendor_id: String,
        name: String,
        source_type: SourceType,
        unit_cost_minor: i64,
        quantity: i64,
        created_at: DateTime<Utc>,
    ) -> ResultLedger<Self> {
        if unit_cost_minor <= 0 {
            return Err(LedgerError::InvalidAmount(
                "unit_cost_minor must be > 0".to_string(),
            ));
        }
        if quantity <= 0 {
            return Err(LedgerError::InvalidAmount(
                "quantity must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            vendor_id,
            name,
            source_type,
            unit_cost_minor,
            quantity_on_hand: quantity,
            quantity_sold: 0,
            quantity_settled: 0,
            archived: false,
            created_at,
        })
    }

    pub fn is_owned(&self) -> bool {
        self.source_type == SourceType::Owned
    }

    pub fn is_consignment(&self) -> bool {
        self.source_type == SourceType::Consignment
    }

    /// Capital value of the stock still on the shelf.
    pub fn stock_value_minor(&self) -> i64 {
        self.unit_cost_minor * self.quantity_on_hand
    }

    /// Cost basis of every unit sold so far.
    pub fn sold_cost_value_minor(&self) -> i64 {
        self.unit_cost_minor * self.quantity_sold
    }

    /// Cost basis of sold consignment units not yet settled by a voucher.
    ///
    /// Always 0 for owned stock.
    pub fn unsettled_sold_value_minor(&self) -> i64 {
        if self.is_consignment() {
            self.unit_cost_minor * (self.quantity_sold - self.quantity_settled)
        } else {
            0
        }
    }

    /// Moves `quantity` units from on-hand to sold.
    pub fn sell(&mut self, quantity: i64) -> ResultLedger<()> {
        if quantity <= 0 {
            return Err(LedgerError::InvalidAmount(
                "quantity must be > 0".to_string(),
            ));
        }
        if quantity > self.quantity_on_hand {
            return Err(LedgerError::InsufficientStock(format!(
                "{}: {} on hand, {} requested",
                self.name, self.quantity_on_hand, quantity
            )));
        }
        self.quantity_on_hand -= quantity;
        self.quantity_sold += quantity;
        Ok(())
    }

    /// Marks every sold consignment unit as settled.
    ///
    /// Returns the cost value that was outstanding before the call.
    pub fn settle_sold(&mut self) -> i64 {
        let outstanding = self.unsettled_sold_value_minor();
        self.quantity_settled = self.quantity_sold;
        outstanding
    }

    /// Archives the row, zeroing on-hand stock.
    ///
    /// Returns the stock value that was on the shelf; for owned stock the
    /// caller refunds it to capital in the same transaction.
    pub fn archive(&mut self) -> i64 {
        let remaining = self.stock_value_minor();
        self.quantity_on_hand = 0;
        self.archived = true;
        remaining
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub vendor_id: String,
    pub name: String,
    pub source_type: String,
    pub unit_cost_minor: i64,
    pub quantity_on_hand: i64,
    pub quantity_sold: i64,
    pub quantity_settled: i64,
    pub archived: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vendors::Entity",
        from = "Column::VendorId",
        to = "super::vendors::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Vendors,
}

impl Related<super::vendors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Product> for ActiveModel {
    fn from(product: &Product) -> Self {
        Self {
            id: ActiveValue::Set(product.id.to_string()),
            vendor_id: ActiveValue::Set(product.vendor_id.clone()),
            name: ActiveValue::Set(product.name.clone()),
            source_type: ActiveValue::Set(product.source_type.as_str().to_string()),
            unit_cost_minor: ActiveValue::Set(product.unit_cost_minor),
            quantity_on_hand: ActiveValue::Set(product.quantity_on_hand),
            quantity_sold: ActiveValue::Set(product.quantity_sold),
            quantity_settled: ActiveValue::Set(product.quantity_settled),
            archived: ActiveValue::Set(product.archived),
            created_at: ActiveValue::Set(product.created_at),
        }
    }
}

impl TryFrom<Model> for Product {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::KeyNotFound("product not exists".to_string()))?,
            vendor_id: model.vendor_id,
            name: model.name,
            source_type: SourceType::try_from(model.source_type.as_str())?,
            unit_cost_minor: model.unit_cost_minor,
            quantity_on_hand: model.quantity_on_hand,
            quantity_sold: model.quantity_sold,
            quantity_settled: model.quantity_settled,
            archived: model.archived,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned() -> Product {
        Product::new(
            "v-1".to_string(),
            "Kettle".to_string(),
            SourceType::Owned,
            100_00,
            10,
            Utc::now(),
        )
        .unwrap()
    }

    fn consignment() -> Product {
        Product::new(
            "v-1".to_string(),
            "Blender".to_string(),
            SourceType::Consignment,
            150_00,
            5,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn sell_moves_units_and_updates_values() {
        let mut product = owned();
        product.sell(4).unwrap();

        assert_eq!(product.quantity_on_hand, 6);
        assert_eq!(product.quantity_sold, 4);
        assert_eq!(product.stock_value_minor(), 6 * 100_00);
        assert_eq!(product.sold_cost_value_minor(), 4 * 100_00);
        assert_eq!(product.unsettled_sold_value_minor(), 0);
    }

    #[test]
    fn sell_rejects_more_than_on_hand() {
        let mut product = owned();
        let err = product.sell(11).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientStock(_)));
        assert_eq!(product.quantity_on_hand, 10);
    }

    #[test]
    fn consignment_tracks_unsettled_payable() {
        let mut product = consignment();
        product.sell(3).unwrap();
        assert_eq!(product.unsettled_sold_value_minor(), 3 * 150_00);

        let outstanding = product.settle_sold();
        assert_eq!(outstanding, 3 * 150_00);
        assert_eq!(product.unsettled_sold_value_minor(), 0);
    }

    #[test]
    fn archive_returns_remaining_stock_value() {
        let mut product = owned();
        product.sell(5).unwrap();
        let remaining = product.archive();

        assert_eq!(remaining, 5 * 100_00);
        assert!(product.archived);
        assert_eq!(product.quantity_on_hand, 0);
        // Sold cost history survives archival.
        assert_eq!(product.sold_cost_value_minor(), 5 * 100_00);
    }
}
