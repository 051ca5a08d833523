//! Purchase recording endpoint.

use api_types::purchase::{CapitalWarning, PurchaseCreated, PurchaseNew, SourceType as ApiSource};
use axum::{Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState};

fn map_source(source: ApiSource) -> ledger::SourceType {
    match source {
        ApiSource::Owned => ledger::SourceType::Owned,
        ApiSource::Consignment => ledger::SourceType::Consignment,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PurchaseNew>,
) -> Result<(StatusCode, Json<PurchaseCreated>), ServerError> {
    let mut cmd = ledger::PurchaseCmd::new(
        payload.vendor_id,
        payload.name,
        map_source(payload.source_type),
        payload.unit_cost_minor,
        payload.quantity,
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let outcome = state.ledger.record_purchase(cmd).await?;

    // The warning never blocks the purchase; the dashboard renders it.
    Ok((
        StatusCode::CREATED,
        Json(PurchaseCreated {
            product_id: outcome.product_id,
            entry_id: outcome.entry.map(|e| e.id),
            warning: outcome.warning.map(|w| CapitalWarning {
                balance_after_minor: w.balance_after_minor,
                shortfall_minor: w.shortfall_minor,
            }),
        }),
    ))
}
