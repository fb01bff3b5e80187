//! Integration tests for the PromptOS API.
//!
//! Every test builds its own router over an in-memory prompt log, a
//! scripted classifier and stub actions, and drives it with `oneshot`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use promptos_action::{
    Action, ActionError, ActionRegistry, DispatchEngine, IntentClassifier, IntentError,
};
use promptos_api::handlers::HealthResponse;
use promptos_api::{create_router, AppState, Speaker};
use promptos_core::config::PromptosConfig;
use promptos_core::error::PromptosError;
use promptos_core::types::{CommandResult, Intent};
use promptos_storage::PromptLog;

// =============================================================================
// Helpers
// =============================================================================

/// Classifier that maps prompts to labels with a lookup table; anything
/// else classifies as "desconhecido".
struct TableClassifier(Vec<(&'static str, &'static str)>);

#[async_trait]
impl IntentClassifier for TableClassifier {
    async fn classify(&self, prompt: &str) -> Result<Intent, IntentError> {
        let label = self
            .0
            .iter()
            .find(|(p, _)| *p == prompt)
            .map(|(_, label)| *label)
            .unwrap_or("desconhecido");
        Ok(Intent::normalize(label))
    }
}

struct DownClassifier;

#[async_trait]
impl IntentClassifier for DownClassifier {
    async fn classify(&self, _prompt: &str) -> Result<Intent, IntentError> {
        Err(IntentError::Status {
            status: 500,
            body: "upstream exploded".to_string(),
        })
    }
}

struct SlowClassifier;

#[async_trait]
impl IntentClassifier for SlowClassifier {
    async fn classify(&self, _prompt: &str) -> Result<Intent, IntentError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Intent::normalize("sync_env"))
    }
}

struct CannedAction {
    name: &'static str,
    outcome: Result<CommandResult, String>,
}

#[async_trait]
impl Action for CannedAction {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn run(&self) -> Result<CommandResult, ActionError> {
        self.outcome.clone().map_err(ActionError::Failed)
    }

    fn describe(&self) -> String {
        format!("canned {}", self.name)
    }
}

#[derive(Default)]
struct RecordingSpeaker {
    said: Mutex<Vec<String>>,
}

#[async_trait]
impl Speaker for RecordingSpeaker {
    async fn speak(&self, text: &str) -> Result<(), PromptosError> {
        self.said.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

struct BrokenSpeaker;

#[async_trait]
impl Speaker for BrokenSpeaker {
    async fn speak(&self, _text: &str) -> Result<(), PromptosError> {
        Err(PromptosError::Speech("no audio device".to_string()))
    }
}

fn registry() -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    let actions = [
        CannedAction {
            name: "sync_env",
            outcome: Ok(CommandResult::success("Ambiente sincronizado").with_speak(true)),
        },
        CannedAction {
            name: "push_zip",
            outcome: Err("disco cheio".to_string()),
        },
        CannedAction {
            name: "generate_architecture",
            outcome: Ok(CommandResult::success("Arquitetura gerada em ARCHITECTURE.md")),
        },
    ];
    for action in actions {
        registry.register(Arc::new(action)).unwrap();
    }
    registry
}

fn classifier() -> Arc<dyn IntentClassifier> {
    Arc::new(TableClassifier(vec![
        ("sincronize o ambiente", "Sync_Env\n"),
        ("envie o zip", "push_zip"),
        ("gere a arquitetura", "generate_architecture"),
    ]))
}

struct Fixture {
    state: AppState,
    log: Arc<PromptLog>,
    speaker: Arc<RecordingSpeaker>,
}

fn fixture_with(classifier: Arc<dyn IntentClassifier>) -> Fixture {
    fixture_with_log(classifier, PromptLog::in_memory().unwrap())
}

fn fixture_with_log(classifier: Arc<dyn IntentClassifier>, log: PromptLog) -> Fixture {
    let log = Arc::new(log);
    let speaker = Arc::new(RecordingSpeaker::default());
    let engine = DispatchEngine::new(classifier, registry());
    let state = AppState::new(PromptosConfig::default(), engine)
        .with_prompt_log(Arc::clone(&log))
        .with_speaker(Arc::clone(&speaker) as Arc<dyn Speaker>);
    Fixture {
        state,
        log,
        speaker,
    }
}

fn fixture() -> Fixture {
    fixture_with(classifier())
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn prompt_request(input: &str) -> Request<Body> {
    post_json("/prompt", &json!({ "input": input }).to_string())
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// POST /prompt
// =============================================================================

#[tokio::test]
async fn test_prompt_known_intent_succeeds() {
    let f = fixture();
    let resp = create_router(f.state)
        .oneshot(prompt_request("sincronize o ambiente"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"status": "✅ Feito", "message": "Ambiente sincronizado"})
    );
}

#[tokio::test]
async fn test_prompt_action_failure_is_presented_as_failed() {
    let f = fixture();
    let resp = create_router(f.state)
        .oneshot(prompt_request("envie o zip"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "⚠️ Falhou");
    assert_eq!(json["message"], "Action failed: disco cheio");
}

#[tokio::test]
async fn test_prompt_unknown_intent_returns_apology() {
    let f = fixture();
    let resp = create_router(f.state)
        .oneshot(prompt_request("faça um café"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({
            "status": "⚠️ Falhou",
            "message": "Desculpa, não entendi como executar: 'faça um café'"
        })
    );
}

#[tokio::test]
async fn test_prompt_missing_input_is_bad_request() {
    let f = fixture();
    let resp = create_router(f.state)
        .oneshot(post_json("/prompt", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "bad_request");
    assert_eq!(f.log.count().unwrap(), 0);
}

#[tokio::test]
async fn test_prompt_empty_input_is_bad_request() {
    let f = fixture();
    let resp = create_router(f.state)
        .oneshot(prompt_request(""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(f.log.count().unwrap(), 0);
}

#[tokio::test]
async fn test_prompt_whitespace_input_gets_apology() {
    let f = fixture();
    let resp = create_router(f.state)
        .oneshot(prompt_request("   "))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({
            "status": "⚠️ Falhou",
            "message": "Desculpa, não entendi como executar: '   '"
        })
    );
    assert_eq!(f.log.recent(1).unwrap()[0].prompt, "   ");
}

#[tokio::test]
async fn test_prompt_malformed_json_is_bad_request() {
    let f = fixture();
    let resp = create_router(f.state)
        .oneshot(post_json("/prompt", "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "bad_request");
}

#[tokio::test]
async fn test_prompt_oversized_body_is_rejected() {
    let f = fixture();
    let huge = "a".repeat(128 * 1024);
    let resp = create_router(f.state)
        .oneshot(prompt_request(&huge))
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
    assert_eq!(f.log.count().unwrap(), 0);
}

#[tokio::test]
async fn test_prompt_classifier_down_is_service_unavailable() {
    let f = fixture_with(Arc::new(DownClassifier));
    let resp = create_router(f.state)
        .oneshot(prompt_request("sincronize o ambiente"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "service_unavailable");
    assert!(!json["message"].as_str().unwrap().contains("exploded"));

    // Nothing was executed, so nothing is logged or spoken.
    assert_eq!(f.log.count().unwrap(), 0);
    assert!(f.speaker.said.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_prompt_timeout_is_gateway_timeout() {
    let f = fixture_with(Arc::new(SlowClassifier));
    let state = f.state.with_request_timeout(Duration::from_millis(50));
    let resp = create_router(state)
        .oneshot(prompt_request("sincronize o ambiente"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body_json(resp).await["error"], "gateway_timeout");
    assert_eq!(f.log.count().unwrap(), 0);
}

#[tokio::test]
async fn test_prompt_is_logged_verbatim_with_result() {
    let f = fixture();
    let app = create_router(f.state);
    app.clone()
        .oneshot(prompt_request("sincronize o ambiente"))
        .await
        .unwrap();
    app.oneshot(prompt_request("faça um café")).await.unwrap();

    let entries = f.log.recent(10).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].prompt, "faça um café");
    assert!(!entries[0].result.success);
    assert_eq!(entries[1].prompt, "sincronize o ambiente");
    assert!(entries[1].result.success);
    assert!(entries[1].result.speak);
    assert!(entries.iter().all(|e| e.status == "executed"));
}

#[tokio::test]
async fn test_prompt_speaks_only_flagged_results() {
    let f = fixture();
    let app = create_router(f.state);
    for prompt in ["sincronize o ambiente", "gere a arquitetura", "faça um café"] {
        let resp = app.clone().oneshot(prompt_request(prompt)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    assert_eq!(
        *f.speaker.said.lock().unwrap(),
        vec!["Ambiente sincronizado".to_string()]
    );
}

#[tokio::test]
async fn test_prompt_survives_speech_failure() {
    let f = fixture();
    let state = f.state.with_speaker(Arc::new(BrokenSpeaker));
    let resp = create_router(state)
        .oneshot(prompt_request("sincronize o ambiente"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "✅ Feito");
}

#[tokio::test]
async fn test_prompt_survives_storage_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("promptos.db");
    let f = fixture_with_log(classifier(), PromptLog::open(&path).unwrap());
    rusqlite::Connection::open(&path)
        .unwrap()
        .execute_batch("DROP TABLE prompt_logs")
        .unwrap();

    let resp = create_router(f.state)
        .oneshot(prompt_request("gere a arquitetura"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await["message"],
        "Arquitetura gerada em ARCHITECTURE.md"
    );
}

#[tokio::test]
async fn test_prompt_without_prompt_log() {
    let engine = DispatchEngine::new(classifier(), registry());
    let state = AppState::new(PromptosConfig::default(), engine);
    let resp = create_router(state)
        .oneshot(prompt_request("gere a arquitetura"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// =============================================================================
// GET /health
// =============================================================================

#[tokio::test]
async fn test_health_lists_actions() {
    let f = fixture();
    let resp = create_router(f.state).oneshot(get("/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let health: HealthResponse = serde_json::from_value(body_json(resp).await).unwrap();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
    assert_eq!(
        health.actions,
        vec!["generate_architecture", "push_zip", "sync_env"]
    );
}

// =============================================================================
// GET /logs
// =============================================================================

#[tokio::test]
async fn test_logs_default_limit_and_order() {
    let f = fixture();
    for i in 0..7 {
        f.log
            .insert(&format!("prompt {}", i), &CommandResult::success("ok"))
            .unwrap();
    }

    let resp = create_router(f.state).oneshot(get("/logs")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["total"], 7);
    let latest = json["latest"].as_array().unwrap();
    assert_eq!(latest.len(), 5);
    assert_eq!(latest[0]["prompt"], "prompt 6");
    assert_eq!(latest[4]["prompt"], "prompt 2");
    assert_eq!(latest[0]["result"], json!({"success": true, "message": "ok"}));
}

#[tokio::test]
async fn test_logs_custom_limit() {
    let f = fixture();
    for i in 0..3 {
        f.log
            .insert(&format!("p{}", i), &CommandResult::failure("x"))
            .unwrap();
    }

    let resp = create_router(f.state)
        .oneshot(get("/logs?limit=2"))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["total"], 3);
    assert_eq!(json["latest"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_logs_rejects_out_of_range_limit() {
    let f = fixture();
    let app = create_router(f.state);
    for uri in ["/logs?limit=0", "/logs?limit=101"] {
        let resp = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_logs_disabled_storage() {
    let engine = DispatchEngine::new(classifier(), registry());
    let state = AppState::new(PromptosConfig::default(), engine);
    let resp = create_router(state).oneshot(get("/logs")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let f = fixture();
    let resp = create_router(f.state)
        .oneshot(get("/nope"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
