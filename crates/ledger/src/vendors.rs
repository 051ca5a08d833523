//! Vendor identity rows.
//!
//! The marketplace keeps its own vendor CRUD elsewhere; the ledger only needs
//! a stable id to hang accounts, products and entries off.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::LedgerError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vendors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::products::Entity")]
    Products,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Vendor> for ActiveModel {
    fn from(vendor: &Vendor) -> Self {
        Self {
            id: ActiveValue::Set(vendor.id.to_string()),
            name: ActiveValue::Set(vendor.name.clone()),
            created_at: ActiveValue::Set(vendor.created_at),
        }
    }
}

impl TryFrom<Model> for Vendor {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::KeyNotFound("vendor not exists".to_string()))?,
            name: model.name,
            created_at: model.created_at,
        })
    }
}
