mod config;
mod db;
mod routes;
mod session;
mod state;
mod sweep;

use std::sync::Arc;

use config::{Config, StoreBackend};
use session::{Directory, FileStore, KeyValueStore, MemoryStore, PgStore, Role};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = Config::from_env().expect("invalid configuration");

    let directory = match &config.directory_path {
        Some(path) => Directory::load(path).await,
        None => Directory::builtin(),
    }
    .expect("directory load failed");
    if directory.is_empty() {
        tracing::warn!("directory has no accounts; every login will be rejected");
    }
    tracing::info!(
        accounts = directory.len(),
        patients = directory.count_role(Role::Patient),
        staff = directory.count_role(Role::HospitalStaff),
        "directory loaded"
    );

    let store: Arc<dyn KeyValueStore> = match &config.store {
        StoreBackend::Memory => {
            tracing::warn!("SESSION_STORE=memory: remembered sessions are lost on restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::File(path) => {
            tracing::info!(path = %path.display(), "file session store");
            Arc::new(FileStore::new(path.clone()))
        }
        StoreBackend::Postgres { database_url, max_connections } => {
            let pool = db::init_pool(database_url, *max_connections)
                .await
                .expect("database init failed");
            tracing::info!("postgres session store");
            Arc::new(PgStore::new(pool))
        }
    };

    let state = state::AppState::new(
        Arc::new(directory),
        store,
        config.routing.clone(),
        config.storage_key.clone(),
        config.cookie_secure,
    );

    // Spawn background eviction of idle client guards.
    let _sweep = sweep::spawn_idle_sweep(state.clone(), config.client_idle_ttl);

    let app = routes::app(state);
    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "mediconnect listening");
    axum::serve(listener, app).await.expect("server failed");
}
