use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filmhub_db::store::PgStore;
use filmhub_web::bootstrap::ensure_superuser;
use filmhub_web::config::ServerConfig;
use filmhub_web::media::MediaStorage;
use filmhub_web::render::build_environment;
use filmhub_web::router::build_app_router;
use filmhub_web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filmhub_web=debug,filmhub_db=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    tracing::info!(
        host = %config.host,
        port = %config.port,
        media_root = %config.media_root.display(),
        "Loaded server configuration"
    );

    // --- Database ---
    let pool = filmhub_db::create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    filmhub_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    filmhub_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let store = Arc::new(PgStore::new(pool));

    // --- Superuser bootstrap ---
    if let Some(admin) = &config.admin {
        ensure_superuser(store.as_ref(), admin)
            .await
            .context("Failed to bootstrap superuser")?;
    }

    // --- Templates and media ---
    let templates = build_environment().context("Failed to compile templates")?;
    tokio::fs::create_dir_all(&config.media_root)
        .await
        .with_context(|| format!("Failed to create {}", config.media_root.display()))?;
    let media = MediaStorage::new(config.media_root.clone());

    // --- App state ---
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );

    let state = AppState {
        store,
        config: Arc::new(config),
        templates: Arc::new(templates),
        media,
    };

    // --- Router ---
    let app = build_app_router(state);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    let (drain_tx, drain_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let _ = drain_tx.send(());
            })
            .await
    });

    // Once a signal arrives, in-flight requests get a bounded drain window.
    tokio::select! {
        result = &mut server => {
            result.context("Server task panicked")?.context("Server error")?;
        }
        Ok(()) = drain_rx => {
            match tokio::time::timeout(shutdown_timeout, &mut server).await {
                Ok(result) => {
                    result.context("Server task panicked")?.context("Server error")?;
                }
                Err(_) => {
                    tracing::warn!(
                        timeout_secs = shutdown_timeout.as_secs(),
                        "Drain timeout elapsed, dropping remaining connections"
                    );
                    server.abort();
                }
            }
        }
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
