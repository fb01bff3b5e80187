//! Route handler functions for all API endpoints.
//!
//! Each handler extracts its input via axum extractors, interacts with
//! AppState services, and returns JSON responses.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use promptos_action::present;
use promptos_core::types::{CommandResult, Presentation};
use promptos_storage::PromptLogEntry;

use crate::error::ApiError;
use crate::state::AppState;

/// Entries returned by `/logs` when no limit is given.
pub const DEFAULT_LOG_LIMIT: u64 = 5;
/// Largest accepted `/logs` limit.
pub const MAX_LOG_LIMIT: u64 = 100;

// =============================================================================
// Request / response types
// =============================================================================

/// Request body for POST /prompt.
#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub input: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogsParams {
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub actions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub total: u64,
    pub latest: Vec<PromptLogEntry>,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /prompt - classify and execute one natural-language command.
pub async fn prompt(
    State(state): State<AppState>,
    body: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<Presentation>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    // Whitespace-only prompts still go through the engine and get the apology.
    let input = match request.input {
        Some(input) if !input.is_empty() => input,
        _ => return Err(ApiError::BadRequest("Field 'input' is required".to_string())),
    };

    let result = tokio::time::timeout(state.request_timeout, state.engine.process(&input))
        .await
        .map_err(|_| {
            tracing::warn!(
                timeout_secs = state.request_timeout.as_secs_f64(),
                "Prompt processing timed out"
            );
            ApiError::GatewayTimeout("Prompt processing timed out".to_string())
        })??;

    record(&state, &input, &result);

    if result.speak {
        if let Err(e) = state.speaker.speak(&result.message).await {
            tracing::warn!(error = %e, "Speech failed");
        }
    }

    tracing::info!(success = result.success, "Prompt executed");
    Ok(Json(present(&result)))
}

/// Append to the prompt log. Storage trouble never fails the request.
fn record(state: &AppState, prompt: &str, result: &CommandResult) {
    let Some(log) = &state.prompt_log else {
        return;
    };
    if let Err(e) = log.insert(prompt, result) {
        tracing::warn!(error = %e, "Failed to record prompt");
    }
}

/// GET /health - liveness plus the registered action names.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        actions: state
            .engine
            .registry()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

/// GET /logs - prompt log summary, newest first.
pub async fn logs(
    State(state): State<AppState>,
    Query(params): Query<LogsParams>,
) -> Result<Json<LogsResponse>, ApiError> {
    let log = state
        .prompt_log
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("Prompt log is disabled".to_string()))?;

    let limit = params.limit.unwrap_or(DEFAULT_LOG_LIMIT);
    if limit == 0 || limit > MAX_LOG_LIMIT {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_LOG_LIMIT
        )));
    }

    Ok(Json(LogsResponse {
        total: log.count()?,
        latest: log.recent(limit)?,
    }))
}
