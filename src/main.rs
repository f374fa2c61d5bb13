//! SBRI Risk Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring seed data, shared state, and middleware.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sbri_risk_service::api::{self, AppState};
use sbri_risk_service::config::AppConfig;
use sbri_risk_service::metrics::Metrics;
use sbri_risk_service::registry::RegistryClient;
use sbri_risk_service::store::{DocumentStore, MemStore};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sbri_risk_service=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env();

    let mem = MemStore::load_or_default(&cfg.seed_path);
    let metrics = Metrics::init(mem.seeded_profiles());
    let store: Arc<dyn DocumentStore> = Arc::new(mem);

    let registry = cfg.registry.as_ref().map(|rc| Arc::new(RegistryClient::new(rc)));

    let state = AppState {
        store,
        registry,
        default_thresholds: cfg.default_thresholds,
    };
    let app = api::router(state).merge(metrics.router());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!(%addr, "sbri risk service listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
