//! REST API server module
//!
//! Exposes every registered task domain and the metadata store over HTTP,
//! together with an OpenAPI 3.1 description of the routes.

use crate::tasks::TaskRegistry;
use crate::{Config, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Where Swagger UI fetches the OpenAPI document from
pub const SWAGGER_DOC_URL: &str = "/api-docs/openapi.json";

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Tasks (`:domain` is one of upload, copy, offline_download, offline_download_transfer)
/// - `GET /task/:domain/undone` - List unfinished tasks
/// - `GET /task/:domain/done` - List finished tasks
/// - `POST /task/:domain/info?tid=` - Get one task
/// - `POST /task/:domain/cancel?tid=` - Cancel one task
/// - `POST /task/:domain/delete?tid=` - Remove one task
/// - `POST /task/:domain/retry?tid=` - Retry one failed task
/// - `POST /task/:domain/clear_done` - Remove every finished task
/// - `POST /task/:domain/clear_succeeded` - Remove every succeeded task
/// - `POST /task/:domain/retry_failed` - Retry every failed task
///
/// ## Metadata
/// - `GET /metadata` - List all entries
/// - `POST /metadata/delete` - Delete entries by file path and name
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled),
///   reading its document from [`SWAGGER_DOC_URL`]
pub fn create_router(tasks: Arc<TaskRegistry>, config: Arc<Config>) -> Router {
    let state = AppState::new(tasks, config.clone());

    let router = Router::new()
        // Tasks
        .route("/task/:domain/undone", get(routes::list_undone))
        .route("/task/:domain/done", get(routes::list_done))
        .route("/task/:domain/info", post(routes::task_info))
        .route("/task/:domain/cancel", post(routes::cancel_task))
        .route("/task/:domain/delete", post(routes::delete_task))
        .route("/task/:domain/retry", post(routes::retry_task))
        .route("/task/:domain/clear_done", post(routes::clear_done))
        .route("/task/:domain/clear_succeeded", post(routes::clear_succeeded))
        .route("/task/:domain/retry_failed", post(routes::retry_failed))
        // Metadata
        .route("/metadata", get(routes::list_metadata))
        .route("/metadata/delete", post(routes::delete_metadata))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    // Swagger UI serves its own copy of the document; /openapi.json stays with
    // the handler above. Merge before applying state.
    let router = if config.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url(SWAGGER_DOC_URL, ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state);

    let router = if config.api.request_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    // CORS is applied last so it wraps everything, including preflight requests
    if config.api.cors_enabled {
        let cors = build_cors_layer(&config.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` or an empty list allows any origin. Origins that are not valid
/// header values are skipped.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until the listener fails. Use [`serve_with_shutdown`] to stop it
/// from the outside.
///
/// # Example
///
/// ```no_run
/// use taskboard::{Config, TaskDomain, TaskQueue, TaskRegistry};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let tasks = Arc::new(
///     TaskRegistry::new().register(TaskDomain::Upload, Arc::new(TaskQueue::new())),
/// );
///
/// // Blocks until the server stops
/// taskboard::api::start_api_server(tasks, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(tasks: Arc<TaskRegistry>, config: Arc<Config>) -> Result<()> {
    serve_with_shutdown(tasks, config, std::future::pending()).await
}

/// Start the API server and stop accepting connections once `shutdown`
/// resolves. In-flight requests are allowed to finish.
pub async fn serve_with_shutdown<F>(
    tasks: Arc<TaskRegistry>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(tasks, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %listener.local_addr().unwrap_or(bind_address),
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
