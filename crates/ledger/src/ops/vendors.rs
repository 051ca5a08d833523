use chrono::Utc;
use sea_orm::{DatabaseTransaction, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{LedgerError, ResultLedger, Vendor, vendors};

use super::{Ledger, normalize_required_name};

impl Ledger {
    /// Registers a vendor identity row.
    pub async fn create_vendor(&self, name: &str) -> ResultLedger<Vendor> {
        let name = normalize_required_name(name, "vendor")?;
        let vendor = Vendor {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
        };
        vendors::ActiveModel::from(&vendor)
            .insert(&self.database)
            .await?;
        Ok(vendor)
    }

    pub(super) async fn require_vendor(
        &self,
        db: &DatabaseTransaction,
        vendor_id: &str,
    ) -> ResultLedger<vendors::Model> {
        vendors::Entity::find_by_id(vendor_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("vendor not exists".to_string()))
    }

    pub async fn vendor(&self, vendor_id: &str) -> ResultLedger<Vendor> {
        let model = vendors::Entity::find_by_id(vendor_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("vendor not exists".to_string()))?;
        Vendor::try_from(model)
    }

    /// All vendors, oldest first. Used by the audit surface to sweep accounts.
    pub async fn list_vendors(&self) -> ResultLedger<Vec<Vendor>> {
        let models = vendors::Entity::find()
            .order_by_asc(vendors::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(Vendor::try_from).collect()
    }
}
