use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::categories::repo::seaorm::SeaOrmCategoryRepository;
use service::import::service::ImportService;
use service::ledger::repo::seaorm::SeaOrmLedgerRepository;
use service::ledger::service::TransactionService;

pub mod transactions;

/// Shared handler state: the two services wired to the SeaORM stores, plus
/// the staging directory for uploads.
#[derive(Clone)]
pub struct ServerState {
    pub transactions: Arc<TransactionService<SeaOrmLedgerRepository, SeaOrmCategoryRepository>>,
    pub import: Arc<ImportService<SeaOrmLedgerRepository, SeaOrmCategoryRepository>>,
    pub upload_dir: PathBuf,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let api = Router::new()
        .route("/transactions", get(transactions::list).post(transactions::create))
        .route("/transactions/:id", delete(transactions::delete))
        .route(
            "/transactions/import",
            post(transactions::import).layer(DefaultBodyLimit::max(10 * 1024 * 1024)),
        );

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
