use poll_service::build_router;
use poll_service::config::{Config, StoreBackend};
use poll_service::db::{self, MemoryStore, PgStore, PollStore};
use poll_service::startup::AppState;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;

    let store: Arc<dyn PollStore> = match &config.store {
        StoreBackend::Postgres { database_url } => {
            let pool = db::init_db(database_url, config.max_connections).await?;
            info!("{}", db::get_pool_stats(&pool));
            db::spawn_health_check(pool.clone());
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            warn!("using in-memory store; polls are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let addr = config.bind_addr;
    let app = build_router(AppState::new(store, config));

    info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
