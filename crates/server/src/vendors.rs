//! Vendor onboarding endpoint.

use api_types::vendor::{VendorNew, VendorView};
use axum::{Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<VendorNew>,
) -> Result<(StatusCode, Json<VendorView>), ServerError> {
    let vendor = state.ledger.create_vendor(&payload.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(VendorView {
            id: vendor.id,
            name: vendor.name,
        }),
    ))
}
