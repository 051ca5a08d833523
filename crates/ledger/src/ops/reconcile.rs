//! Drift detection between the stored balance and first principles.
//!
//! Every reporting surface that needs certainty about a vendor's position
//! calls [`Ledger::reconcile`] instead of re-deriving the formula; the
//! formula lives here and nowhere else. The engine never writes a
//! correction, it returns a diagnosis for an operator to act on.

use std::collections::HashSet;
use std::fmt;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{EntryKind, MoneyCents, RefKind, ResultLedger, entries};

use super::{Ledger, valuation::InventoryValuation, with_tx};

/// Smallest currency unit; deltas at or below this are noise, not drift.
pub const RECONCILE_EPSILON_MINOR: i64 = 1;

/// One attributed share of a reconciliation delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriftExplanation {
    /// Profit entries posted against consignment-sourced products, the
    /// historically observed bug class.
    ConsignmentProfitPostings { amount_minor: i64, entries: usize },
    /// The entry log and the account disagree: either a row violates
    /// `after == before + signed`, or `initial + Σ signed` misses the stored
    /// balance. Indicates a non-atomic write happened somewhere.
    LedgerDivergence {
        entry_violations: usize,
        account_drift_minor: i64,
    },
    /// Sold consignment stock awaiting its supplier voucher. Not a bug: the
    /// stored balance overstates freely available capital by this amount
    /// until settlement.
    UnsettledConsignmentPayable { amount_minor: i64 },
    /// Whatever the known classes could not account for.
    Unexplained { amount_minor: i64 },
}

impl fmt::Display for DriftExplanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConsignmentProfitPostings {
                amount_minor,
                entries,
            } => write!(
                f,
                "erroneous consignment profit postings: {} across {entries} entries",
                MoneyCents::new(*amount_minor)
            ),
            Self::LedgerDivergence {
                entry_violations,
                account_drift_minor,
            } => write!(
                f,
                "ledger/account divergence: {entry_violations} entries violate the balance pair, account drift {}",
                MoneyCents::new(*account_drift_minor)
            ),
            Self::UnsettledConsignmentPayable { amount_minor } => write!(
                f,
                "unsettled consignment payable: {}",
                MoneyCents::new(*amount_minor)
            ),
            Self::Unexplained { amount_minor } => {
                write!(f, "unexplained delta: {}", MoneyCents::new(*amount_minor))
            }
        }
    }
}

/// Outcome of a reconciliation run. Drift is a result value, never an error.
#[derive(Clone, Debug)]
pub struct ReconcileReport {
    pub vendor_id: String,
    pub expected_minor: i64,
    pub actual_minor: i64,
    /// `actual − expected`.
    pub delta_minor: i64,
    pub explanations: Vec<DriftExplanation>,
}

impl ReconcileReport {
    /// `true` when the balance matches first principles and the entry log is
    /// internally consistent.
    pub fn is_clean(&self) -> bool {
        self.delta_minor.abs() <= RECONCILE_EPSILON_MINOR && self.explanations.is_empty()
    }
}

impl Ledger {
    /// Recomputes the expected balance from first principles and compares it
    /// against the stored one.
    ///
    /// For owned stock, `Σ purchases − Σ refunds` equals on-shelf value plus
    /// the cost basis of everything sold, and sales credit only the margin;
    /// so the balance identity is
    ///
    /// ```text
    /// expected = initial − owned_stock − owned_sold_cost + owned_profit
    ///          − consignment_unsettled + (receipts − payments)
    /// ```
    ///
    /// Read-only, single snapshot. Errors only on unreadable storage.
    pub async fn reconcile(&self, vendor_id: &str) -> ResultLedger<ReconcileReport> {
        with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, vendor_id).await?;
            let products = self.load_products(&db_tx, vendor_id).await?;
            let entry_models = entries::Entity::find()
                .filter(entries::Column::VendorId.eq(vendor_id.to_string()))
                .order_by_asc(entries::Column::CreatedAt)
                .order_by_asc(entries::Column::Id)
                .all(&db_tx)
                .await?;

            let valuation = InventoryValuation::from_products(&products);
            let owned_sold_cost_minor: i64 = products
                .iter()
                .filter(|p| p.is_owned())
                .map(|p| p.sold_cost_value_minor())
                .sum();
            let consignment_ids: HashSet<String> = products
                .iter()
                .filter(|p| p.is_consignment())
                .map(|p| p.id.to_string())
                .collect();

            let mut signed_sum_minor = 0i64;
            let mut owned_profit_minor = 0i64;
            let mut erroneous_profit_minor = 0i64;
            let mut erroneous_profit_entries = 0usize;
            let mut receipts_minor = 0i64;
            let mut payments_minor = 0i64;
            let mut entry_violations = 0usize;

            for model in &entry_models {
                let kind = EntryKind::try_from(model.kind.as_str())?;
                let signed = kind.signed_amount(model.amount_minor);
                signed_sum_minor += signed;

                if model.balance_after_minor - model.balance_before_minor != signed {
                    entry_violations += 1;
                }

                match kind {
                    EntryKind::SaleProfit | EntryKind::ConsignmentProfit => {
                        // The legacy bug posted profit with a product
                        // reference pointing at consignment stock.
                        let against_consignment = model.reference_kind.as_deref()
                            == Some(RefKind::Product.as_str())
                            && model
                                .reference_id
                                .as_deref()
                                .is_some_and(|id| consignment_ids.contains(id));
                        if against_consignment {
                            erroneous_profit_minor += model.amount_minor;
                            erroneous_profit_entries += 1;
                        } else {
                            owned_profit_minor += model.amount_minor;
                        }
                    }
                    EntryKind::ReceiptFromSupplier => receipts_minor += model.amount_minor,
                    EntryKind::PaymentToSupplier => payments_minor += model.amount_minor,
                    EntryKind::Purchase | EntryKind::Refund => {}
                }
            }

            let actual_minor = account.current_balance_minor;
            let account_drift_minor =
                actual_minor - (account.initial_capital_minor + signed_sum_minor);
            let unsettled_minor = valuation.consignment_sold_unsettled_value_minor;

            let expected_minor = account.initial_capital_minor
                - valuation.owned_stock_value_minor
                - owned_sold_cost_minor
                + owned_profit_minor
                - unsettled_minor
                + receipts_minor
                - payments_minor;
            let delta_minor = actual_minor - expected_minor;

            // Attribute the delta to known classes; whatever is left over is
            // the interesting part. The divergence audit runs even at delta
            // zero: a corrupted balance_after changes neither sum.
            let mut explanations = Vec::new();
            let mut residual_minor = delta_minor;

            if entry_violations > 0 || account_drift_minor != 0 {
                explanations.push(DriftExplanation::LedgerDivergence {
                    entry_violations,
                    account_drift_minor,
                });
                residual_minor -= account_drift_minor;
            }
            if erroneous_profit_minor != 0 {
                explanations.push(DriftExplanation::ConsignmentProfitPostings {
                    amount_minor: erroneous_profit_minor,
                    entries: erroneous_profit_entries,
                });
                residual_minor -= erroneous_profit_minor;
            }
            if unsettled_minor != 0 {
                explanations.push(DriftExplanation::UnsettledConsignmentPayable {
                    amount_minor: unsettled_minor,
                });
                residual_minor -= unsettled_minor;
            }
            if residual_minor.abs() > RECONCILE_EPSILON_MINOR {
                explanations.push(DriftExplanation::Unexplained {
                    amount_minor: residual_minor,
                });
            }

            Ok(ReconcileReport {
                vendor_id: vendor_id.to_string(),
                expected_minor,
                actual_minor,
                delta_minor,
                explanations,
            })
        })
    }
}
