use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use configs::AppConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::{RecordStore, SeaOrmRecordStore};

use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Connect the database and run the schema bootstrap. Any failure is fatal.
pub async fn build_store(cfg: &AppConfig) -> anyhow::Result<SeaOrmRecordStore> {
    if let Some(path) = cfg.database.sqlite_file_path() {
        common::env::ensure_parent_dir(&path).await?;
    }
    let db = models::db::connect_with_config(&cfg.database)
        .await
        .context("could not load database")?;
    let store = SeaOrmRecordStore::new(db);
    store
        .initialize()
        .await
        .context("could not initialize database")?;
    Ok(store)
}

/// Public entry: build the app and run the HTTP server until a shutdown signal.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    common::env::check_static_dir(&cfg.server.static_dir).await;

    let store = build_store(&cfg).await?;
    let state = AppState::new(Arc::new(store));
    let app: Router = routes::build_router(state, &cfg.server.static_dir, build_cors());

    let listener = TcpListener::bind(cfg.bind_addr())
        .await
        .with_context(|| format!("could not bind {}", cfg.bind_addr()))?;
    let addr = listener.local_addr()?;
    info!(%addr, "starting server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(event = "shutdown_signal", "shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(url: String) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.database.url = url;
        cfg
    }

    #[tokio::test]
    async fn builds_store_on_writable_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_for(format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("nested/mind.sqlite").display()
        ));
        let store = build_store(&cfg).await.unwrap();
        assert_eq!(store.lookup(uuid::Uuid::new_v4(), "").await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_read_only_database_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_for(format!(
            "sqlite://{}?mode=ro",
            dir.path().join("absent.sqlite").display()
        ));
        let err = build_store(&cfg).await.err().expect("open must fail");
        assert!(format!("{err:#}").contains("database"));
    }

    #[tokio::test]
    async fn read_only_database_fails_initialize() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.sqlite");
        std::fs::write(&path, b"").unwrap();
        let cfg = config_for(format!("sqlite://{}?mode=ro", path.display()));
        assert!(build_store(&cfg).await.is_err());
    }
}
