//! Supplier voucher endpoint.

use api_types::voucher::{VoucherCreated, VoucherDirection as ApiDirection, VoucherNew};
use axum::{Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState};

fn map_direction(direction: ApiDirection) -> ledger::VoucherDirection {
    match direction {
        ApiDirection::Receipt => ledger::VoucherDirection::Receipt,
        ApiDirection::Payment => ledger::VoucherDirection::Payment,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<VoucherNew>,
) -> Result<(StatusCode, Json<VoucherCreated>), ServerError> {
    let mut cmd = ledger::VoucherCmd::new(
        payload.vendor_id,
        map_direction(payload.direction),
        payload.amount_minor,
        payload.voucher_id,
    );
    if let Some(product_id) = payload.settles_product_id {
        cmd = cmd.settles_product(product_id);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let outcome = state.ledger.record_voucher(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(VoucherCreated {
            entry_id: outcome.entry.id,
            settled_value_minor: outcome.settled_value_minor,
        }),
    ))
}
