use std::net::SocketAddr;

use axum::Router;
use common::utils::logging::{init_logging_default, init_logging_json};
use configs::{AppConfig, StoreConfig};
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use models::seed::{seed_records, seed_users};
use models::{Record, User};
use service::runtime;
use service::storage::json_collection_store::JsonCollectionStore;

use crate::routes::{self, ServerState};

/// `LOG_FORMAT=json` switches to structured output.
pub fn init_logging() {
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => init_logging_json(),
        _ => init_logging_default(),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open both collections under `store.data_dir`, seeding empty ones when enabled.
pub async fn open_state(store: &StoreConfig) -> anyhow::Result<ServerState> {
    runtime::ensure_data_dir(&store.data_dir).await?;
    let (record_seed, user_seed): (Vec<Record>, Vec<User>) = if store.seed {
        (seed_records(), seed_users())
    } else {
        (Vec::new(), Vec::new())
    };
    let records = JsonCollectionStore::new_seeded(store.records_path(), record_seed).await?;
    let users = JsonCollectionStore::new_seeded(store.users_path(), user_seed).await?;
    Ok(ServerState { records, users })
}

pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = open_state(&cfg.store).await?;
    Ok(routes::build_router(state, build_cors()))
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = AppConfig::load_or_default()?;
    let app = build_app(&cfg).await?;

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, data_dir = %cfg.store.data_dir, "starting resource store");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
