// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use files_manager::{
    api::router,
    config::{Config, LogFormat, SessionBackend},
    state::AppState,
    storage::{DocumentDatabase, LocalBlobStore, MemorySessionStore, RedisSessionStore, SessionStore},
    sweeper::SessionSweeper,
    telemetry::init_tracing,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(LogFormat::from_env());
    let config = Config::from_env();

    let db = Arc::new(DocumentDatabase::open(&config.db_path)?);

    let shutdown = CancellationToken::new();

    let sessions: Arc<dyn SessionStore> = match config.session_backend {
        SessionBackend::Redis => {
            let store = RedisSessionStore::connect(&config.redis_url).await?;
            tracing::info!(url = %config.redis_url, "session store connected");
            Arc::new(store)
        }
        SessionBackend::Memory => {
            tracing::warn!("in-memory sessions; all sessions are lost on restart");
            let store = Arc::new(MemorySessionStore::new());
            tokio::spawn(SessionSweeper::new(store.clone()).run(shutdown.clone()));
            store
        }
    };

    let blobs = Arc::new(LocalBlobStore::new(&config.folder_path));
    let state = AppState::new(db.clone(), db, sessions, blobs, config.session_ttl);
    let app = router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        folder = %config.folder_path.display(),
        "Files manager listening (docs at /docs)"
    );

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("Shutdown signal received");
        signal_token.cancel();
    });

    let server_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { server_token.cancelled().await })
        .await?;

    shutdown.cancel();
    tracing::info!("Server shut down");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
