use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Egp,
}

pub mod vendor {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VendorNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VendorView {
        pub id: Uuid,
        pub name: String,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub vendor_id: String,
        /// Starting cash contribution; immutable after onboarding.
        pub initial_capital_minor: i64,
        pub currency: Option<Currency>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub vendor_id: String,
        pub initial_capital_minor: i64,
        /// Materialized balance. For a verified position use the
        /// reconciliation endpoint instead.
        pub current_balance_minor: i64,
        pub currency: Currency,
    }
}

pub mod purchase {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SourceType {
        Owned,
        Consignment,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseNew {
        pub vendor_id: String,
        pub name: String,
        pub source_type: SourceType,
        pub unit_cost_minor: i64,
        pub quantity: i64,
        pub description: Option<String>,
    }

    /// Non-fatal overdraw notice; the purchase still committed.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CapitalWarning {
        pub balance_after_minor: i64,
        pub shortfall_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseCreated {
        pub product_id: Uuid,
        /// Absent for consignment stock (no capital movement).
        pub entry_id: Option<Uuid>,
        pub warning: Option<CapitalWarning>,
    }
}

pub mod sale {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SaleNew {
        pub vendor_id: String,
        pub product_id: Uuid,
        pub quantity: i64,
        pub unit_price_minor: i64,
        /// Id of the originating order item; dedup key for the profit entry.
        pub sale_id: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SaleCreated {
        pub product_id: Uuid,
        pub quantity: i64,
        /// Margin credited to capital; 0 for consignment sales.
        pub profit_minor: i64,
        pub entry_id: Option<Uuid>,
    }
}

pub mod product {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductArchive {
        pub vendor_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductArchived {
        pub product_id: Uuid,
        /// Unsold owned stock value returned to capital.
        pub refunded_minor: i64,
        pub entry_id: Option<Uuid>,
    }
}

pub mod voucher {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum VoucherDirection {
        Receipt,
        Payment,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VoucherNew {
        pub vendor_id: String,
        pub direction: VoucherDirection,
        pub amount_minor: i64,
        /// Caller-supplied voucher id; dedup key per direction.
        pub voucher_id: String,
        /// Consignment product whose sold units this voucher settles.
        pub settles_product_id: Option<Uuid>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VoucherCreated {
        pub entry_id: Uuid,
        pub settled_value_minor: i64,
    }
}

pub mod entry {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum EntryKind {
        Purchase,
        Refund,
        SaleProfit,
        ConsignmentProfit,
        ReceiptFromSupplier,
        PaymentToSupplier,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryListQuery {
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        ///
        /// Oldest → newer pagination (audit replay order).
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryView {
        pub id: Uuid,
        pub kind: EntryKind,
        /// Non-negative magnitude; `signed_amount_minor` carries direction.
        pub amount_minor: i64,
        pub signed_amount_minor: i64,
        pub balance_before_minor: i64,
        pub balance_after_minor: i64,
        pub description: Option<String>,
        pub reference_kind: Option<String>,
        pub reference_id: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryListResponse {
        pub entries: Vec<EntryView>,
        /// Opaque cursor for fetching the next page (newer items).
        pub next_cursor: Option<String>,
    }
}

pub mod valuation {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ValuationView {
        pub owned_stock_value_minor: i64,
        pub consignment_stock_value_minor: i64,
        pub consignment_sold_unsettled_value_minor: i64,
    }
}

pub mod reconcile {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReconcileView {
        pub vendor_id: String,
        pub expected_minor: i64,
        pub actual_minor: i64,
        pub delta_minor: i64,
        /// Human-readable drift attributions, most severe first.
        pub explanations: Vec<String>,
        pub clean: bool,
    }
}
