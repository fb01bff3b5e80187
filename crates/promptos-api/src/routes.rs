//! Router setup with all API routes and middleware.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use promptos_core::error::PromptosError;

use crate::handlers;
use crate::state::AppState;

/// Request bodies are single prompts.
const BODY_LIMIT: usize = 64 * 1024;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Allow browser clients served from the same localhost port.
    let port = state.config.general.port;
    let origins: Vec<HeaderValue> = [
        format!("http://127.0.0.1:{}", port),
        format!("http://localhost:{}", port),
    ]
    .iter()
    .filter_map(|origin| origin.parse().ok())
    .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/prompt", post(handlers::prompt))
        .route("/logs", get(handlers::logs))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on 127.0.0.1 and the given port.
pub async fn start_server(port: u16, state: AppState) -> Result<(), PromptosError> {
    let addr = format!("127.0.0.1:{}", port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PromptosError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(addr = %addr, "API server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| PromptosError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
