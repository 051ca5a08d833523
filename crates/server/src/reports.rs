//! Read-only reporting endpoints: valuation and reconciliation.
//!
//! These never mutate. Operators act on the reconciliation diagnosis
//! themselves; the server will not "fix" a drifted balance.

use api_types::{reconcile::ReconcileView, valuation::ValuationView};
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState};

pub async fn valuation(
    State(state): State<ServerState>,
    Path(vendor_id): Path<String>,
) -> Result<Json<ValuationView>, ServerError> {
    let valuation = state.ledger.valuation(&vendor_id).await?;
    Ok(Json(ValuationView {
        owned_stock_value_minor: valuation.owned_stock_value_minor,
        consignment_stock_value_minor: valuation.consignment_stock_value_minor,
        consignment_sold_unsettled_value_minor: valuation.consignment_sold_unsettled_value_minor,
    }))
}

pub async fn reconcile(
    State(state): State<ServerState>,
    Path(vendor_id): Path<String>,
) -> Result<Json<ReconcileView>, ServerError> {
    let report = state.ledger.reconcile(&vendor_id).await?;
    let clean = report.is_clean();
    Ok(Json(ReconcileView {
        vendor_id: report.vendor_id,
        expected_minor: report.expected_minor,
        actual_minor: report.actual_minor,
        delta_minor: report.delta_minor,
        explanations: report
            .explanations
            .iter()
            .map(ToString::to_string)
            .collect(),
        clean,
    }))
}
