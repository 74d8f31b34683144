//! Application assembly and lifecycle.
//!
//! One router serves both execution modes: server mode binds a listener,
//! handler mode hands the router to an external invoker.

use crate::config::{CrmConfig, DeploymentMode, StoreBackend};
use crate::handlers;
use crate::services::{CrmService, CrmStore, MemoryStore, MongoStore};
use axum::{
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: CrmConfig,
    pub crm: CrmService,
}

/// Application container for managing server lifecycle.
pub struct Application {
    listener: Option<TcpListener>,
    port: Option<u16>,
    router: Router,
    state: AppState,
}

impl Application {
    /// Opens the configured store, then assembles the application.
    pub async fn build(config: CrmConfig) -> Result<Self, AppError> {
        let store = connect_store(&config).await?;
        Self::build_with_store(config, store).await
    }

    /// Assembles the application around an already opened store.
    pub async fn build_with_store(
        config: CrmConfig,
        store: Arc<dyn CrmStore>,
    ) -> Result<Self, AppError> {
        let state = AppState {
            crm: CrmService::new(store, &config.crm),
            config: config.clone(),
        };
        let router = router(state.clone());

        let (listener, port) = match config.mode {
            DeploymentMode::Server => {
                // Port 0 = random port for testing
                let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
                let listener = TcpListener::bind(addr).await.map_err(|e| {
                    tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
                    AppError::from(e)
                })?;
                let port = listener.local_addr()?.port();
                tracing::info!(
                    port,
                    api_prefix = %config.http.api_prefix,
                    "Invoice CRM service listening"
                );
                (Some(listener), Some(port))
            }
            DeploymentMode::Handler => {
                tracing::info!(
                    api_prefix = %config.http.api_prefix,
                    "Invoice CRM service built in handler mode"
                );
                (None, None)
            }
        };

        Ok(Self {
            listener,
            port,
            router,
            state,
        })
    }

    /// Bound port; `None` in handler mode.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// The fully layered router, for invokers that drive requests directly.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve until SIGINT/SIGTERM. Only valid in server mode.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let Some(listener) = self.listener else {
            return Err(std::io::Error::other(format!(
                "cannot serve in {} mode: no listener is bound",
                self.state.config.mode
            )));
        };

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn connect_store(config: &CrmConfig) -> Result<Arc<dyn CrmStore>, AppError> {
    match config.store {
        StoreBackend::Mongodb => {
            let store = MongoStore::connect(&config.mongodb.uri, &config.mongodb.database)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to MongoDB: {}", e);
                    e
                })?;
            store.initialize_indexes().await.map_err(|e| {
                tracing::error!("Failed to initialize database indexes: {}", e);
                e
            })?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Builds the HTTP router: probes at the root, API routes under the prefix.
pub fn router(state: AppState) -> Router {
    let prefix = state.config.http.api_prefix.clone();
    let api = |path: &str| format!("{}{}", prefix, path);

    let mut app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            &api("/companies"),
            get(handlers::list_companies).post(handlers::create_company),
        )
        .route(&api("/companies/:id"), get(handlers::get_company))
        .route(
            &api("/companies/:id/invoices"),
            get(handlers::list_company_invoices),
        )
        .route(&api("/invoices"), post(handlers::create_invoice));

    if prefix.is_empty() {
        app = app.route("/", get(handlers::liveness));
    } else {
        app = app
            .route(&prefix, get(handlers::liveness))
            .route(&api("/"), get(handlers::liveness));
    }

    app.layer(axum::middleware::from_fn(metrics_middleware))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
