//! Sale recording endpoint.
//!
//! Callers invoke this for owned-sourced and consignment-sourced items alike;
//! the engine decides whether capital moves. Consignment sales come back with
//! `profit_minor: 0` and no entry id.

use api_types::sale::{SaleCreated, SaleNew};
use axum::{Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SaleNew>,
) -> Result<(StatusCode, Json<SaleCreated>), ServerError> {
    let mut cmd = ledger::SaleCmd::new(
        payload.vendor_id,
        payload.product_id,
        payload.quantity,
        payload.unit_price_minor,
        payload.sale_id,
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let outcome = state.ledger.record_sale(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(SaleCreated {
            product_id: outcome.product_id,
            quantity: outcome.quantity,
            profit_minor: outcome.profit_minor,
            entry_id: outcome.entry.map(|e| e.id),
        }),
    ))
}
