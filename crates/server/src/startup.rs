use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use service::{JsonRosterStore, ParticipantService};
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

/// Wire the file-backed roster store and participant service into the application state.
pub async fn build_state(config: &AppConfig) -> Result<AppState, StartupError> {
    let directory = &config.storage.participants_directory;
    common::env::ensure_data_dir(directory).await?;
    let store = JsonRosterStore::new(directory.clone()).await?;
    let default_year = config.storage.resolved_default_year();
    info!(directory = %directory.display(), default_year, "participant storage ready");
    Ok(AppState {
        participants: Arc::new(ParticipantService::new(store)),
        default_year,
    })
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
    }
}

/// Public entry: build the app and run the HTTP server until Ctrl+C
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&config).await?;
    let app: Router = routes::build_router(state, routes::build_cors());

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.clone(), source })?;
    info!(%addr, "start listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
