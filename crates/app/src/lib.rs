//! wfport application composition root
//!
//! Chooses storage and backend adapters from configuration and composes the
//! domain routers into a single application.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

use wfport_backends::{BackendConfig, BackendRegistry, BackendRegistryFactory};
use wfport_common::{Config, StorageBackend};
use wfport_environments::{
    EnvironmentDirectory, EnvironmentsState, InMemoryEnvironmentDirectory, PgEnvironmentDirectory,
};
use wfport_portability::{
    EventLog, InMemoryEventLog, InMemoryTestStore, PgEventLog, PgTestStore, PortabilityOrchestrator,
    PortabilityState, TestStore,
};

/// Largest accepted request body. Workflow documents ride inline.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// The storage collaborators shared by both domains
#[derive(Clone)]
pub struct Stores {
    pub directory: Arc<dyn EnvironmentDirectory>,
    pub tests: Arc<dyn TestStore>,
    pub events: Arc<dyn EventLog>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            directory: Arc::new(InMemoryEnvironmentDirectory::new()),
            tests: Arc::new(InMemoryTestStore::new()),
            events: Arc::new(InMemoryEventLog::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            directory: Arc::new(PgEnvironmentDirectory::new(pool.clone())),
            tests: Arc::new(PgTestStore::new(pool.clone())),
            events: Arc::new(PgEventLog::new(pool)),
        }
    }

    /// Build the stores selected by `STORAGE_BACKEND`, running migrations for postgres
    pub async fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        match config.storage_backend {
            StorageBackend::Memory => {
                tracing::info!("Using in-memory storage");
                Ok(Self::in_memory())
            }
            StorageBackend::Postgres => {
                let database_url = config.database_url.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("DATABASE_URL is required when STORAGE_BACKEND=postgres")
                })?;
                let pool = PgPool::connect(database_url)
                    .await
                    .map_err(|e| anyhow::anyhow!("Database connection failed: {}", e))?;
                sqlx::migrate!("../../migrations").run(&pool).await?;
                tracing::info!("Database connection established and migrations applied");
                Ok(Self::postgres(pool))
            }
        }
    }
}

/// Create the main application router from configuration
pub async fn create_app(config: &Config) -> Result<Router, anyhow::Error> {
    let stores = Stores::from_config(config).await?;
    let backends = BackendRegistryFactory::create(BackendConfig::from_env()?)?;
    tracing::info!(?backends, "Backend adapters ready");
    Ok(build_router(stores, backends, config.fanout_concurrency))
}

/// Compose domain routers over the given collaborators
pub fn build_router(
    stores: Stores,
    backends: BackendRegistry,
    fanout_concurrency: Option<usize>,
) -> Router {
    let orchestrator = PortabilityOrchestrator::new(
        stores.directory.clone(),
        stores.tests,
        stores.events,
        backends,
        fanout_concurrency,
    );

    let environments_state = EnvironmentsState {
        directory: stores.directory,
    };
    let portability_state = PortabilityState {
        orchestrator: Arc::new(orchestrator),
    };

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { "wfport API v0.0.1-SNAPSHOT" }),
        )
        .merge(wfport_environments::routes().with_state(environments_state))
        .merge(wfport_portability::routes().with_state(portability_state))
}

/// CORS layer from a comma-separated origin list. Unparseable origins are skipped.
pub fn build_cors_layer(origins: &str) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub fn body_limit_layer() -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(MAX_BODY_BYTES)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
