//! Server module for managing HTTP server lifecycle
//!
//! This module handles server initialization, startup, and graceful shutdown.

use crate::api::routes::create_router;
use crate::config::{StorageBackend, settings::Settings};
use crate::db::{establish_async_connection_pool, run_pending_migrations};
use crate::repositories::Repositories;
use crate::state::AppState;
use tokio::net::TcpListener;
use tokio::signal;

/// HTTP server manager
pub struct Server {
    settings: Settings,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Start the server and run until shutdown signal
    ///
    /// This method:
    /// 1. Logs startup information
    /// 2. Opens the configured user store (migrating first if asked to)
    /// 3. Creates application state
    /// 4. Binds to configured address
    /// 5. Starts the HTTP server with graceful shutdown
    ///
    /// # Errors
    /// - Store initialization errors
    /// - Address binding errors
    /// - Server runtime errors
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            environment = %self.settings.application.environment.as_str(),
            "Application starting"
        );

        tracing::info!(
            host = %self.settings.server.host,
            port = %self.settings.server.port,
            request_timeout = %self.settings.server.request_timeout,
            "Server configuration loaded"
        );

        // Token secret itself is never logged
        tracing::info!(
            token_expiration_hours = %self.settings.jwt.token_expiration,
            secret_configured = %(!self.settings.jwt.secret.is_empty()),
            "JWT configuration loaded"
        );

        tracing::info!(
            default_limit = %self.settings.pagination.default_limit,
            max_limit = %self.settings.pagination.max_limit,
            "Pagination configuration loaded"
        );

        let repos = self.open_store().await?;

        let state = AppState::new(
            repos,
            self.settings.jwt.clone(),
            self.settings.pagination,
        );
        let router = create_router(state, &self.settings.server);
        tracing::info!("Router configured");

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    async fn open_store(&self) -> anyhow::Result<Repositories> {
        let backend = self.settings.storage.backend;
        tracing::info!(backend = backend.as_str(), "Opening user store");

        match backend {
            StorageBackend::Memory => {
                tracing::warn!("Using the in-memory user store; data is lost on restart");
                Ok(Repositories::in_memory())
            }
            StorageBackend::Postgres => {
                let database = &self.settings.database;
                tracing::info!(
                    max_connections = %database.max_connections,
                    min_connections = %database.min_connections,
                    connection_timeout = %database.connection_timeout,
                    auto_migrate = %database.auto_migrate,
                    "Database configuration loaded"
                );

                if database.auto_migrate {
                    let applied = run_pending_migrations(&database.url).await?;
                    tracing::info!(count = applied.len(), "Pending migrations applied");
                }

                let pool = establish_async_connection_pool(database).await?;
                tracing::info!("Database connection pool initialized");
                Ok(Repositories::postgres(pool))
            }
        }
    }
}

/// Waits for Ctrl+C or SIGTERM.
///
/// A signal handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
