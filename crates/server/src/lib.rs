use axum::{Json, http::StatusCode, response::IntoResponse};
use ledger::LedgerError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod accounts;
mod entries;
mod products;
mod purchases;
mod reports;
mod sales;
mod server;
mod user;
mod vendors;
mod vouchers;

pub enum ServerError {
    Ledger(LedgerError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_ledger_error(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::AccountNotFound(_) | LedgerError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::AccountExists(_) | LedgerError::DuplicateReference(_) => StatusCode::CONFLICT,
        // Retryable: the guarded balance update lost a race and rolled back.
        LedgerError::Conflict(_) => StatusCode::SERVICE_UNAVAILABLE,
        LedgerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        LedgerError::InvalidAmount(_)
        | LedgerError::InsufficientStock(_)
        | LedgerError::InvalidCursor(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_ledger_error(err: LedgerError) -> String {
    match err {
        LedgerError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Ledger(err) => {
                (status_for_ledger_error(&err), message_for_ledger_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<LedgerError> for ServerError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_not_found_maps_to_404() {
        let res = ServerError::from(LedgerError::AccountNotFound("v".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn ledger_duplicate_reference_maps_to_409() {
        let res =
            ServerError::from(LedgerError::DuplicateReference("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn ledger_conflict_maps_to_503() {
        let res = ServerError::from(LedgerError::Conflict("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn ledger_validation_maps_to_422() {
        let res = ServerError::from(LedgerError::InvalidAmount("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
