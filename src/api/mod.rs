//! HTTP server module
//!
//! Serves the report form, accepts submissions and exposes a small JSON
//! surface (health and OpenAPI) for monitoring and non-browser clients.

use crate::config::UploadConfig;
use crate::{Config, Relay, Result};
use axum::{Router, extract::DefaultBodyLimit, http::HeaderValue, routing::get};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod page;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Allowance for the non-file form fields and multipart framing on top of
/// the attachment ceiling
pub const FORM_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Whole-request body limit for a given upload configuration
pub fn body_limit(limits: &UploadConfig) -> u64 {
    limits.max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES)
}

/// Create the router with all route definitions
///
/// # Routes
///
/// ## Form
/// - `GET /` - Report form
/// - `POST /` - Submit a report (multipart/form-data)
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(relay: Arc<Relay>, config: Arc<Config>) -> Router {
    let state = AppState::new(relay, config.clone());
    let limit = usize::try_from(body_limit(&config.upload)).unwrap_or(usize::MAX);

    let router = Router::new()
        // Form
        .route("/", get(routes::show_form).post(routes::submit_report))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    // Swagger UI serves its own copy of the spec so it does not collide with /openapi.json
    let router = if config.server.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router
        .with_state(state)
        .layer(DefaultBodyLimit::max(limit))
        .layer(TraceLayer::new_for_http());

    if config.server.cors_enabled {
        let cors = build_cors_layer(&config.server.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` (or an empty list) allows any origin.
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

/// Start the server on the configured bind address.
///
/// Runs until SIGINT/SIGTERM (Ctrl+C elsewhere), then finishes in-flight
/// requests and returns.
///
/// # Example
///
/// ```no_run
/// use report_relay::{Config, Relay};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::from_env(None)?);
/// let relay = Arc::new(Relay::new(&config)?);
///
/// // Blocks until shutdown
/// report_relay::api::start_api_server(relay, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(relay: Arc<Relay>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.bind_address;

    tracing::info!(address = %bind_address, "Starting form server");

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    serve(listener, relay, config, crate::shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve<F>(
    listener: TcpListener,
    relay: Arc<Relay>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(relay, config);

    if let Ok(address) = listener.local_addr() {
        tracing::info!(address = %address, "Form server listening");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("Form server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
