//! Capital account endpoints.

use api_types::account::{AccountNew, AccountView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

fn map_currency(currency: ledger::Currency) -> api_types::Currency {
    match currency {
        ledger::Currency::Egp => api_types::Currency::Egp,
    }
}

fn account_view(account: ledger::CapitalAccount) -> AccountView {
    AccountView {
        vendor_id: account.vendor_id,
        initial_capital_minor: account.initial_capital_minor,
        current_balance_minor: account.current_balance_minor,
        currency: map_currency(account.currency),
    }
}

pub async fn open(
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let mut cmd = ledger::OpenAccountCmd::new(payload.vendor_id, payload.initial_capital_minor);
    if let Some(currency) = payload.currency {
        cmd = cmd.currency(match currency {
            api_types::Currency::Egp => ledger::Currency::Egp,
        });
    }

    let account = state.ledger.open_account(cmd).await?;
    Ok((StatusCode::CREATED, Json(account_view(account))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(vendor_id): Path<String>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.ledger.account(&vendor_id).await?;
    Ok(Json(account_view(account)))
}
