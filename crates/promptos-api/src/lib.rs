//! PromptOS API crate - axum HTTP server, route handlers, speech output.
//!
//! Accepts prompts over HTTP, runs them through the dispatch engine,
//! records them in the prompt log and speaks results that ask for it.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod speech;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use speech::{CommandSpeaker, LogSpeaker, Speaker};
pub use state::AppState;
