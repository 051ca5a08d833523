//! Command structs for ledger operations.
//!
//! These types group parameters for write operations
//! (purchase/sale/archive/voucher/apply), keeping call sites readable and
//! avoiding long argument lists.

use uuid::Uuid;

use crate::{Currency, EntryKind, EntryRef, SourceType};

/// Post a single ledger entry (the raw transaction-engine operation).
///
/// Flow operations ([`PurchaseCmd`], [`SaleCmd`], ...) are built on top of
/// this; use them when an inventory row has to move in the same transaction.
#[derive(Clone, Debug)]
pub struct ApplyCmd {
    pub vendor_id: String,
    pub kind: EntryKind,
    /// Non-negative magnitude; the engine derives the sign from `kind`.
    pub amount_minor: i64,
    pub description: Option<String>,
    /// Dedup key: a second apply with the same `(vendor, kind, reference)`
    /// fails instead of double-posting.
    pub reference: Option<EntryRef>,
}

impl ApplyCmd {
    #[must_use]
    pub fn new(vendor_id: impl Into<String>, kind: EntryKind, amount_minor: i64) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            kind,
            amount_minor,
            description: None,
            reference: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn reference(mut self, reference: EntryRef) -> Self {
        self.reference = Some(reference);
        self
    }
}

/// Onboard a vendor's capital account.
#[derive(Clone, Debug)]
pub struct OpenAccountCmd {
    pub vendor_id: String,
    pub initial_capital_minor: i64,
    pub currency: Option<Currency>,
}

impl OpenAccountCmd {
    #[must_use]
    pub fn new(vendor_id: impl Into<String>, initial_capital_minor: i64) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            initial_capital_minor,
            currency: None,
        }
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }
}

/// Record a stock purchase as a new product batch.
#[derive(Clone, Debug)]
pub struct PurchaseCmd {
    pub vendor_id: String,
    pub name: String,
    pub source: SourceType,
    pub unit_cost_minor: i64,
    pub quantity: i64,
    pub description: Option<String>,
}

impl PurchaseCmd {
    #[must_use]
    pub fn new(
        vendor_id: impl Into<String>,
        name: impl Into<String>,
        source: SourceType,
        unit_cost_minor: i64,
        quantity: i64,
    ) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            name: name.into(),
            source,
            unit_cost_minor,
            quantity,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Record a sale of `quantity` units of a product.
#[derive(Clone, Debug)]
pub struct SaleCmd {
    pub vendor_id: String,
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price_minor: i64,
    /// Caller-supplied id of the originating order item; dedup key for the
    /// profit entry.
    pub sale_id: String,
    pub description: Option<String>,
}

impl SaleCmd {
    #[must_use]
    pub fn new(
        vendor_id: impl Into<String>,
        product_id: Uuid,
        quantity: i64,
        unit_price_minor: i64,
        sale_id: impl Into<String>,
    ) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            product_id,
            quantity,
            unit_price_minor,
            sale_id: sale_id.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Archive a product, refunding remaining owned stock to capital.
#[derive(Clone, Debug)]
pub struct ArchiveProductCmd {
    pub vendor_id: String,
    pub product_id: Uuid,
}

impl ArchiveProductCmd {
    #[must_use]
    pub fn new(vendor_id: impl Into<String>, product_id: Uuid) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            product_id,
        }
    }
}

/// Direction of a supplier voucher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoucherDirection {
    /// Supplier pays the vendor (credit).
    Receipt,
    /// Vendor pays the supplier (debit).
    Payment,
}

impl VoucherDirection {
    pub fn entry_kind(self) -> EntryKind {
        match self {
            Self::Receipt => EntryKind::ReceiptFromSupplier,
            Self::Payment => EntryKind::PaymentToSupplier,
        }
    }
}

/// Post a supplier voucher against a vendor's capital.
#[derive(Clone, Debug)]
pub struct VoucherCmd {
    pub vendor_id: String,
    pub direction: VoucherDirection,
    pub amount_minor: i64,
    /// Caller-supplied voucher id; dedup key per direction.
    pub voucher_id: String,
    /// Consignment product whose sold units this voucher settles, if any.
    pub settles_product_id: Option<Uuid>,
    pub description: Option<String>,
}

impl VoucherCmd {
    #[must_use]
    pub fn new(
        vendor_id: impl Into<String>,
        direction: VoucherDirection,
        amount_minor: i64,
        voucher_id: impl Into<String>,
    ) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            direction,
            amount_minor,
            voucher_id: voucher_id.into(),
            settles_product_id: None,
            description: None,
        }
    }

    #[must_use]
    pub fn settles_product(mut self, product_id: Uuid) -> Self {
        self.settles_product_id = Some(product_id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
