//! Ledger entry primitives.
//!
//! A `LedgerEntry` is one immutable record of a single capital-affecting
//! event. Rows are append-only: never updated, never deleted. Each row
//! captures the balance on both sides of the event, so the log can be audited
//! without replaying it.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, LedgerError, ResultLedger};

/// The fixed set of balance-affecting event kinds.
///
/// The sign of an entry is owned by the kind, never by the caller: callers
/// always supply non-negative magnitudes and the engine decides direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Purchase,
    Refund,
    SaleProfit,
    ConsignmentProfit,
    ReceiptFromSupplier,
    PaymentToSupplier,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Refund => "refund",
            Self::SaleProfit => "sale_profit",
            Self::ConsignmentProfit => "consignment_profit",
            Self::ReceiptFromSupplier => "receipt_from_supplier",
            Self::PaymentToSupplier => "payment_to_supplier",
        }
    }

    /// Returns `true` for kinds that decrease the balance.
    pub fn is_debit(self) -> bool {
        matches!(self, Self::Purchase | Self::PaymentToSupplier)
    }

    /// Returns `true` for realized-margin credits.
    pub fn is_profit(self) -> bool {
        matches!(self, Self::SaleProfit | Self::ConsignmentProfit)
    }

    /// Applies the kind's sign to a non-negative magnitude.
    pub fn signed_amount(self, amount_minor: i64) -> i64 {
        if self.is_debit() {
            -amount_minor
        } else {
            amount_minor
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "purchase" => Ok(Self::Purchase),
            "refund" => Ok(Self::Refund),
            "sale_profit" => Ok(Self::SaleProfit),
            "consignment_profit" => Ok(Self::ConsignmentProfit),
            "receipt_from_supplier" => Ok(Self::ReceiptFromSupplier),
            "payment_to_supplier" => Ok(Self::PaymentToSupplier),
            other => Err(LedgerError::InvalidAmount(format!(
                "invalid entry kind: {other}"
            ))),
        }
    }
}

/// What an entry reference points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    Product,
    Sale,
    Voucher,
}

impl RefKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Sale => "sale",
            Self::Voucher => "voucher",
        }
    }
}

impl TryFrom<&str> for RefKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "product" => Ok(Self::Product),
            "sale" => Ok(Self::Sale),
            "voucher" => Ok(Self::Voucher),
            other => Err(LedgerError::InvalidAmount(format!(
                "invalid reference kind: {other}"
            ))),
        }
    }
}

/// Link to the originating product, sale or voucher.
///
/// Doubles as the dedup key: a second `apply` with the same
/// `(vendor, kind, reference)` is rejected instead of double-posting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRef {
    pub kind: RefKind,
    pub id: String,
}

impl EntryRef {
    #[must_use]
    pub fn product(id: Uuid) -> Self {
        Self {
            kind: RefKind::Product,
            id: id.to_string(),
        }
    }

    #[must_use]
    pub fn sale(id: impl Into<String>) -> Self {
        Self {
            kind: RefKind::Sale,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn voucher(id: impl Into<String>) -> Self {
        Self {
            kind: RefKind::Voucher,
            id: id.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub vendor_id: String,
    pub kind: EntryKind,
    /// Non-negative magnitude; direction comes from `kind`.
    pub amount_minor: i64,
    pub balance_before_minor: i64,
    pub balance_after_minor: i64,
    pub currency: Currency,
    pub description: Option<String>,
    pub reference: Option<EntryRef>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(
        vendor_id: String,
        kind: EntryKind,
        amount_minor: i64,
        balance_before_minor: i64,
        currency: Currency,
        description: Option<String>,
        reference: Option<EntryRef>,
        created_at: DateTime<Utc>,
    ) -> ResultLedger<Self> {
        if amount_minor <= 0 {
            return Err(LedgerError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        let balance_after_minor = balance_before_minor
            .checked_add(kind.signed_amount(amount_minor))
            .ok_or_else(|| LedgerError::InvalidAmount("balance overflow".to_string()))?;
        Ok(Self {
            id: Uuid::new_v4(),
            vendor_id,
            kind,
            amount_minor,
            balance_before_minor,
            balance_after_minor,
            currency,
            description,
            reference,
            created_at,
        })
    }

    /// The entry's effect on the balance, with sign applied.
    pub fn signed_amount_minor(&self) -> i64 {
        self.kind.signed_amount(self.amount_minor)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub vendor_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub balance_before_minor: i64,
    pub balance_after_minor: i64,
    pub currency: String,
    pub description: Option<String>,
    pub reference_kind: Option<String>,
    pub reference_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::VendorId",
        to = "super::accounts::Column::VendorId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            vendor_id: ActiveValue::Set(entry.vendor_id.clone()),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(entry.amount_minor),
            balance_before_minor: ActiveValue::Set(entry.balance_before_minor),
            balance_after_minor: ActiveValue::Set(entry.balance_after_minor),
            currency: ActiveValue::Set(entry.currency.code().to_string()),
            description: ActiveValue::Set(entry.description.clone()),
            reference_kind: ActiveValue::Set(
                entry.reference.as_ref().map(|r| r.kind.as_str().to_string()),
            ),
            reference_id: ActiveValue::Set(entry.reference.as_ref().map(|r| r.id.clone())),
            created_at: ActiveValue::Set(entry.created_at),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let reference = match (model.reference_kind.as_deref(), model.reference_id) {
            (Some(kind), Some(id)) => Some(EntryRef {
                kind: RefKind::try_from(kind)?,
                id,
            }),
            _ => None,
        };
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::KeyNotFound("ledger entry not exists".to_string()))?,
            vendor_id: model.vendor_id,
            kind: EntryKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            balance_before_minor: model.balance_before_minor,
            balance_after_minor: model.balance_after_minor,
            currency: Currency::try_from(model.currency.as_str()).unwrap_or_default(),
            description: model.description,
            reference,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_is_owned_by_kind() {
        assert_eq!(EntryKind::Purchase.signed_amount(100), -100);
        assert_eq!(EntryKind::PaymentToSupplier.signed_amount(100), -100);
        assert_eq!(EntryKind::Refund.signed_amount(100), 100);
        assert_eq!(EntryKind::SaleProfit.signed_amount(100), 100);
        assert_eq!(EntryKind::ConsignmentProfit.signed_amount(100), 100);
        assert_eq!(EntryKind::ReceiptFromSupplier.signed_amount(100), 100);
    }

    #[test]
    fn new_entry_captures_both_sides_of_the_balance() {
        let entry = LedgerEntry::new(
            "v-1".to_string(),
            EntryKind::Purchase,
            1000,
            7500,
            Currency::Egp,
            None,
            None,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(entry.balance_before_minor, 7500);
        assert_eq!(entry.balance_after_minor, 6500);
        assert_eq!(entry.signed_amount_minor(), -1000);
    }

    #[test]
    fn new_entry_rejects_non_positive_magnitude() {
        let res = LedgerEntry::new(
            "v-1".to_string(),
            EntryKind::Refund,
            0,
            0,
            Currency::Egp,
            None,
            None,
            Utc::now(),
        );
        assert!(res.is_err());
    }

    #[test]
    fn kind_round_trips_through_storage_string() {
        for kind in [
            EntryKind::Purchase,
            EntryKind::Refund,
            EntryKind::SaleProfit,
            EntryKind::ConsignmentProfit,
            EntryKind::ReceiptFromSupplier,
            EntryKind::PaymentToSupplier,
        ] {
            assert_eq!(EntryKind::try_from(kind.as_str()).unwrap(), kind);
        }
    }
}
