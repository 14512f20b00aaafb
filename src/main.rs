use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use workspace_gate::app::{app_with_security, AppState};
use workspace_gate::config::{config, AppConfig};
use workspace_gate::database::DatabaseManager;
use workspace_gate::gate::{AccessGate, RouteTable};
use workspace_gate::is_development;
use workspace_gate::store::{ConfigStore, MembershipStore, MemorySeed, MemoryStore, PgStore};
use workspace_gate::types::WorkspaceId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    tracing::info!("Starting Workspace Gate in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }

    let routes = match &config.gate.routes_file {
        Some(path) => RouteTable::load(path).with_context(|| format!("loading route table {}", path))?,
        None => RouteTable::dashboard(),
    };
    tracing::info!("Route table has {} entries", routes.entries().len());

    let state = build_state(config, routes).await?;
    let db = state.db.clone();
    let app = app_with_security(state, &config.security);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Workspace Gate listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server")?;

    if let Some(db) = db {
        db.close().await;
    }
    Ok(())
}

async fn build_state(config: &AppConfig, routes: RouteTable) -> anyhow::Result<AppState> {
    let configs: Arc<dyn ConfigStore>;
    let members: Arc<dyn MembershipStore>;
    let mut db = None;

    if config.database.url.is_some() {
        let manager = Arc::new(DatabaseManager::new(config.database.clone()));
        let store = Arc::new(PgStore::new(manager.clone()));
        configs = store.clone();
        members = store;
        db = Some(manager);
    } else {
        if !is_development!() {
            anyhow::bail!("DATABASE_URL must be set outside development");
        }
        tracing::warn!("DATABASE_URL not set, using the in-memory workspace store");
        let store = Arc::new(MemoryStore::new());
        if let Some(path) = &config.gate.seed_file {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading seed file {}", path))?;
            let seeded = store.seed(MemorySeed::from_json(&raw)?).await;
            tracing::info!("Seeded {} workspaces from {}", seeded, path);
        }
        configs = store.clone();
        members = store;
    }

    let gate = AccessGate::new(configs)
        .with_root_workspace(WorkspaceId::new(config.gate.root_workspace_id))
        .with_lookup_timeout(Duration::from_millis(config.gate.lookup_timeout_ms));

    let mut state = AppState::new(gate, members, routes, &config.security.jwt_secret);
    if let Some(db) = db {
        state = state.with_database(db);
    }
    Ok(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
