//! Ledger entry listing (audit replay order).

use api_types::entry::{EntryKind as ApiKind, EntryListQuery, EntryListResponse, EntryView};
use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{ServerError, server::ServerState};

fn map_kind(kind: ledger::EntryKind) -> ApiKind {
    match kind {
        ledger::EntryKind::Purchase => ApiKind::Purchase,
        ledger::EntryKind::Refund => ApiKind::Refund,
        ledger::EntryKind::SaleProfit => ApiKind::SaleProfit,
        ledger::EntryKind::ConsignmentProfit => ApiKind::ConsignmentProfit,
        ledger::EntryKind::ReceiptFromSupplier => ApiKind::ReceiptFromSupplier,
        ledger::EntryKind::PaymentToSupplier => ApiKind::PaymentToSupplier,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Path(vendor_id): Path<String>,
    Query(query): Query<EntryListQuery>,
) -> Result<Json<EntryListResponse>, ServerError> {
    let limit = query.limit.unwrap_or(50);
    let filter = ledger::EntryListFilter::default();

    let (entries, next_cursor) = state
        .ledger
        .list_entries(&vendor_id, limit, query.cursor.as_deref(), &filter)
        .await?;

    let entries = entries
        .into_iter()
        .map(|entry| EntryView {
            id: entry.id,
            kind: map_kind(entry.kind),
            amount_minor: entry.amount_minor,
            signed_amount_minor: entry.signed_amount_minor(),
            balance_before_minor: entry.balance_before_minor,
            balance_after_minor: entry.balance_after_minor,
            description: entry.description,
            reference_kind: entry.reference.as_ref().map(|r| r.kind.as_str().to_string()),
            reference_id: entry.reference.map(|r| r.id),
            created_at: entry.created_at,
        })
        .collect();

    Ok(Json(EntryListResponse {
        entries,
        next_cursor,
    }))
}
