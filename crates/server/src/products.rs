//! Product archival endpoint (the "delete product" flow).

use api_types::product::{ProductArchive, ProductArchived};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn archive(
    State(state): State<ServerState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<ProductArchive>,
) -> Result<Json<ProductArchived>, ServerError> {
    let outcome = state
        .ledger
        .archive_product(ledger::ArchiveProductCmd::new(payload.vendor_id, product_id))
        .await?;

    Ok(Json(ProductArchived {
        product_id: outcome.product_id,
        refunded_minor: outcome.refunded_minor,
        entry_id: outcome.entry.map(|e| e.id),
    }))
}
