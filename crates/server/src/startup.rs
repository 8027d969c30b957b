use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, ServerState};
use service::promotion::{PromotionService, SeaOrmPromotionRepository};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
    }
}

/// Connect the store, make sure the schema exists and assemble the router.
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let db = models::db::connect_with_config(&config.database).await?;
    let repo = Arc::new(SeaOrmPromotionRepository::new(db));
    let promotions = Arc::new(PromotionService::new(repo));
    promotions.init().await?;

    let state = ServerState::new(promotions, &config.server);
    Ok(routes::build_router(state, build_cors()))
}

/// Public entry: build the app and serve until Ctrl+C.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&config).await?;

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, debug = config.server.debug, "starting promotions service");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
