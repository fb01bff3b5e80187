//! PromptOS binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Build the intent classifier and the action registry
//! 3. Open the prompt log (SQLite) unless storage is disabled
//! 4. Pick the speech output
//! 5. Start the axum REST API server

mod cli;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use promptos_action::{ActionRegistry, DispatchEngine, LlmIntentClassifier};
use promptos_api::state::AppState;
use promptos_api::{routes, speech};
use promptos_core::config::{expand_home, PromptosConfig};
use promptos_storage::PromptLog;

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing so its log level can apply; a missing
    // file is the normal first run.
    let config_file = args.config_path();
    let (mut config, load_error) = match PromptosConfig::load_or_default(&config_file) {
        Ok(config) => (config, None),
        Err(e) => (PromptosConfig::default(), Some(e)),
    };

    // Tracing: RUST_LOG > --log-level > config.
    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)),
        )
        .init();

    tracing::info!("Starting PromptOS v{}", env!("CARGO_PKG_VERSION"));
    match load_error {
        Some(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
        None => tracing::info!(path = %config_file.display(), "Configuration resolved"),
    }

    args.apply(&mut config);

    // Classifier + actions.
    let classifier = LlmIntentClassifier::from_config(config.llm.clone()).map_err(|e| {
        tracing::error!(error = %e, "Intent classifier unavailable");
        e
    })?;
    tracing::info!(
        model = classifier.model(),
        format = ?classifier.api_format(),
        "Intent classifier ready"
    );

    let registry = ActionRegistry::with_defaults(&config.actions);
    for name in registry.names() {
        if let Some(action) = registry.resolve(name) {
            tracing::info!(action = name, "{}", action.describe());
        }
    }
    let engine = DispatchEngine::new(Arc::new(classifier), registry);

    // Prompt log.
    let prompt_log = if config.storage.enabled {
        let data_dir = expand_home(&config.general.data_dir);
        let db_path = data_dir.join(&config.storage.db_file);
        Some(Arc::new(PromptLog::open(&db_path)?))
    } else {
        tracing::info!("Prompt log disabled in config");
        None
    };

    let speaker = speech::from_config(&config.speech);

    let port = config.general.port;
    let mut state = AppState::new(config, engine).with_speaker(speaker);
    if let Some(log) = prompt_log {
        state = state.with_prompt_log(log);
    }

    if let Err(e) = routes::start_server(port, state).await {
        tracing::error!(error = %e, "Server stopped");
        tracing::error!("Try: PROMPTOS_PORT={} promptos", port.saturating_add(1));
        return Err(e.into());
    }

    Ok(())
}
