use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{accounts, entries, products, purchases, reports, sales, user, vendors, vouchers};
use ledger::Ledger;

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<Ledger>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/vendors", post(vendors::create))
        .route("/accounts", post(accounts::open))
        .route("/accounts/{vendor_id}", get(accounts::get))
        .route("/purchases", post(purchases::create))
        .route("/sales", post(sales::create))
        .route("/products/{product_id}/archive", post(products::archive))
        .route("/vouchers", post(vouchers::create))
        .route("/vendors/{vendor_id}/entries", get(entries::list))
        .route("/vendors/{vendor_id}/valuation", get(reports::valuation))
        .route(
            "/vendors/{vendor_id}/reconciliation",
            get(reports::reconcile),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(ledger: Ledger, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(ledger, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    ledger: Ledger,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        ledger: Arc::new(ledger),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    ledger: Ledger,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(ledger, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
