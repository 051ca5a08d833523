//! Vendor capital accounts.
//!
//! One row per vendor. `initial_capital_minor` is set at onboarding and never
//! changes; `current_balance_minor` is mutated exclusively by the transaction
//! engine, inside the same database transaction as the ledger entry it
//! corresponds to.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Currency, LedgerError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalAccount {
    pub vendor_id: String,
    pub initial_capital_minor: i64,
    pub current_balance_minor: i64,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "capital_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub vendor_id: String,
    pub initial_capital_minor: i64,
    pub current_balance_minor: i64,
    pub currency: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
    #[sea_orm(
        belongs_to = "super::vendors::Entity",
        from = "Column::VendorId",
        to = "super::vendors::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Vendors,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl Related<super::vendors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CapitalAccount> for ActiveModel {
    fn from(account: &CapitalAccount) -> Self {
        Self {
            vendor_id: ActiveValue::Set(account.vendor_id.clone()),
            initial_capital_minor: ActiveValue::Set(account.initial_capital_minor),
            current_balance_minor: ActiveValue::Set(account.current_balance_minor),
            currency: ActiveValue::Set(account.currency.code().to_string()),
            created_at: ActiveValue::Set(account.created_at),
        }
    }
}

impl TryFrom<Model> for CapitalAccount {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            vendor_id: model.vendor_id,
            initial_capital_minor: model.initial_capital_minor,
            current_balance_minor: model.current_balance_minor,
            currency: Currency::try_from(model.currency.as_str()).unwrap_or_default(),
            created_at: model.created_at,
        })
    }
}
