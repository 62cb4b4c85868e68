//! Leaderboard admin backend entrypoint wiring REST, SSE and the result store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leaderboard_admin_back::{
    config::{AppConfig, StoreBackend},
    dao::result_store::memory::MemoryResultStore,
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let backend = config.store_backend();
    let app_state = AppState::new(config);
    start_store(&app_state, backend).await;

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, ?backend, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the in-memory store directly or hand a remote backend to the supervisor.
async fn start_store(state: &SharedState, backend: StoreBackend) {
    match backend {
        StoreBackend::Memory => {
            warn!("using the in-memory result store; results are lost on restart");
            state
                .set_result_store(Arc::new(MemoryResultStore::new()))
                .await;
        }
        #[cfg(feature = "couch-store")]
        StoreBackend::Couch => {
            use leaderboard_admin_back::dao::{
                result_store::{
                    ResultStore,
                    couchdb::{CouchConfig, CouchResultStore},
                },
                storage::StorageError,
            };
            use leaderboard_admin_back::services::storage_supervisor;

            tokio::spawn(storage_supervisor::run(state.clone(), || async {
                let config = CouchConfig::from_env()?;
                let store = CouchResultStore::connect(config).await?;
                Ok::<_, StorageError>(Arc::new(store) as Arc<dyn ResultStore>)
            }));
        }
        #[cfg(feature = "mongo-store")]
        StoreBackend::Mongo => {
            use leaderboard_admin_back::dao::{
                result_store::{
                    ResultStore,
                    mongodb::{MongoConfig, MongoResultStore},
                },
                storage::StorageError,
            };
            use leaderboard_admin_back::services::storage_supervisor;

            tokio::spawn(storage_supervisor::run(state.clone(), || async {
                let config = MongoConfig::from_env().await?;
                let store = MongoResultStore::connect(config).await?;
                Ok::<_, StorageError>(Arc::new(store) as Arc<dyn ResultStore>)
            }));
        }
        #[allow(unreachable_patterns)]
        other => warn!(
            backend = ?other,
            "store backend not compiled in; staying in degraded mode"
        ),
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
