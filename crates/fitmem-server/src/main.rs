use axum::{routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod adapters;
mod application;
mod config;
mod models;
mod routes;

use adapters::{InMemoryRecordStore, PgRecordStore};
use application::{MemoryEvents, MemoryService};
use config::{ServerConfig, StorageBackend};
use fitmem::RecordStore;

/// Memory service over whichever store the deployment selected
pub type AppMemoryService = MemoryService<dyn RecordStore>;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub memory_service: Arc<AppMemoryService>,
}

#[derive(Serialize)]
struct HealthCheck {
    status: String,
    message: String,
    version: String,
}

async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        message: "Fitmem API is running - remembering what you like to lift and eat".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the full router around shared state
pub fn app(state: AppState) -> Router {
    let openapi = routes::swagger::ApiDoc::openapi();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(routes::memory::router())
        .merge(routes::observation::router())
        .merge(routes::legacy::router())
        .merge(routes::events::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secrets: shuttle_runtime::SecretStore,
) -> shuttle_axum::ShuttleAxum {
    let config = ServerConfig::from_secrets(&secrets)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🏋️ Fitmem API initializing...");

    let store: Arc<dyn RecordStore> = match config.storage {
        StorageBackend::Postgres => {
            sqlx::migrate!()
                .run(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to run database migrations: {}", e))?;
            tracing::info!("✅ Database migrations completed");
            Arc::new(PgRecordStore::new(pool))
        }
        StorageBackend::InMemory => {
            tracing::warn!("⚠️  FITMEM_STORAGE=memory - memories will not survive restarts");
            Arc::new(InMemoryRecordStore::new())
        }
    };

    let events = MemoryEvents::new(config.event_capacity);
    let memory_service = Arc::new(MemoryService::new(store, events));
    tracing::info!(
        "🔔 Memory notifications enabled (capacity {})",
        config.event_capacity
    );

    let router = app(AppState { memory_service });

    tracing::info!("📚 Swagger UI: /swagger-ui");
    tracing::info!("✅ Fitmem API ready");

    Ok(router.into())
}
