use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use crate::error::Result;

/// Top-level configuration for PromptOS.
///
/// Loaded from `~/.promptos/config.toml` by default. Every section falls back
/// to its defaults, so a partial file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptosConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub actions: ActionsConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl PromptosConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, treating a missing file as "use the defaults".
    ///
    /// A file that exists but cannot be read or parsed is still an error,
    /// so the caller can report it before falling back.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the prompt log database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// API server port.
    pub port: u16,
    /// Deadline for processing one prompt, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.promptos/data".to_string(),
            log_level: "info".to_string(),
            port: 3030,
            request_timeout_secs: 60,
        }
    }
}

/// Language model settings used by the intent classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Completion endpoint. URLs on anthropic.com use the messages format,
    /// everything else the OpenAI chat-completions format.
    pub api_url: String,
    /// Model identifier.
    pub model: String,
    /// Output token budget for the intent label.
    pub max_tokens: u32,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Instruction template; `{prompt}` is replaced with the raw prompt.
    pub prompt_template: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4".to_string(),
            max_tokens: 20,
            api_key_env: "OPENAI_API_KEY".to_string(),
            prompt_template: "Qual a intenção deste comando?: '{prompt}'".to_string(),
        }
    }
}

impl LlmConfig {
    /// Render the instruction template for a prompt.
    pub fn render_prompt(&self, prompt: &str) -> String {
        self.prompt_template.replace("{prompt}", prompt)
    }
}

/// Per-action settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    pub sync_env: SyncEnvConfig,
    pub push_zip: PushZipConfig,
    pub generate_architecture: ArchitectureConfig,
}

/// `sync_env`: run a shell command that brings the environment up to date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncEnvConfig {
    pub command: String,
    pub working_dir: String,
    pub speak: bool,
}

impl Default for SyncEnvConfig {
    fn default() -> Self {
        Self {
            command: "git pull --ff-only".to_string(),
            working_dir: ".".to_string(),
            speak: false,
        }
    }
}

/// `push_zip`: package a directory and optionally upload it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushZipConfig {
    pub source_dir: String,
    pub output_path: String,
    /// When set, the archive is sent here with an HTTP PUT.
    pub upload_url: Option<String>,
    /// File or directory names skipped while packaging.
    pub exclude: Vec<String>,
    pub speak: bool,
}

impl Default for PushZipConfig {
    fn default() -> Self {
        Self {
            source_dir: ".".to_string(),
            output_path: "promptos-bundle.zip".to_string(),
            upload_url: None,
            exclude: vec![".git".to_string(), "target".to_string()],
            speak: false,
        }
    }
}

/// `generate_architecture`: write a Markdown overview of a project tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchitectureConfig {
    pub project_dir: String,
    /// Relative paths are resolved against `project_dir`.
    pub output_path: String,
    pub max_depth: usize,
    pub speak: bool,
}

impl Default for ArchitectureConfig {
    fn default() -> Self {
        Self {
            project_dir: ".".to_string(),
            output_path: "ARCHITECTURE.md".to_string(),
            max_depth: 3,
            speak: false,
        }
    }
}

/// Text-to-speech collaborator settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub enabled: bool,
    /// Program invoked with the message as its only argument (e.g. `espeak`).
    pub command: Option<String>,
}

/// Prompt log storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub enabled: bool,
    /// Database file name inside `general.data_dir`.
    pub db_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            db_file: "promptos.db".to_string(),
        }
    }
}
