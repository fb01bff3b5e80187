pub mod config;
pub mod error;
pub mod types;

pub use config::PromptosConfig;
pub use error::{PromptosError, Result};
pub use types::*;
