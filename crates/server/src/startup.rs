use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

use axum::http::header::HeaderName;
use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, transactions, ServerState};
use service::categories::repo::seaorm::SeaOrmCategoryRepository;
use service::import::service::ImportService;
use service::ledger::repo::seaorm::SeaOrmLedgerRepository;
use service::ledger::service::TransactionService;

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

/// Permissive CORS, exposing the entry-count header to browser clients
pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
        .expose_headers([HeaderName::from_static(transactions::TOTAL_COUNT_HEADER)])
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr() -> anyhow::Result<SocketAddr> {
    let (host, port) = match configs::load_default() {
        Ok(cfg) => {
            let s = cfg.server;
            (s.host, s.port)
        }
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(3333);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

fn load_upload_dir() -> PathBuf {
    match configs::load_default() {
        Ok(cfg) => PathBuf::from(cfg.upload.dir),
        Err(_) => PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| "tmp".to_string())),
    }
}

/// Wire both services to SeaORM stores over one connection pool.
pub fn build_state(db: sea_orm::DatabaseConnection, upload_dir: PathBuf) -> ServerState {
    let ledger = Arc::new(SeaOrmLedgerRepository { db: db.clone() });
    let categories = Arc::new(SeaOrmCategoryRepository { db });
    ServerState {
        transactions: Arc::new(TransactionService::new(ledger.clone(), categories.clone())),
        import: Arc::new(ImportService::new(ledger, categories)),
        upload_dir,
    }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let upload_dir = load_upload_dir();
    service::runtime::ensure_env(&upload_dir.to_string_lossy()).await?;

    // DB connection, honoring pool settings when a config file is present
    let db = match configs::load_default() {
        Ok(mut cfg) => {
            cfg.database.normalize_from_env();
            models::db::connect_with_config(&cfg.database).await?
        }
        Err(_) => models::db::connect().await?,
    };

    // Schema is applied at boot; migrations are idempotent
    migration::Migrator::up(&db, None).await?;

    let state = build_state(db, upload_dir);

    let cors = build_cors();
    let app: Router = routes::build_router(cors, state);

    let addr = load_bind_addr()?;
    info!(%addr, "starting ledger server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
