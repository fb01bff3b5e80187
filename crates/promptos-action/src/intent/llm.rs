//! LLM-backed intent classifier.
//!
//! Speaks the OpenAI chat-completions format (OpenAI, DeepSeek and other
//! compatible providers) and the Anthropic messages format. The prompt is
//! interpolated into a fixed instruction template and the first completion
//! becomes the intent label.

use async_trait::async_trait;
use promptos_core::config::LlmConfig;
use promptos_core::types::Intent;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::IntentError;
use crate::intent::IntentClassifier;

/// Wire format of the completion endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

impl ApiFormat {
    /// Detect the format from the endpoint URL.
    pub fn detect(url: &str) -> Self {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }
}

/// Intent classifier calling a hosted language model.
pub struct LlmIntentClassifier {
    client: Client,
    config: LlmConfig,
    api_key: String,
    api_format: ApiFormat,
}

impl LlmIntentClassifier {
    /// Create a classifier with an explicit API key.
    pub fn new(config: LlmConfig, api_key: String) -> Self {
        let api_format = ApiFormat::detect(&config.api_url);
        Self {
            client: Client::new(),
            config,
            api_key,
            api_format,
        }
    }

    /// Create a classifier reading the API key from the environment
    /// variable named by `config.api_key_env`.
    pub fn from_config(config: LlmConfig) -> Result<Self, IntentError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| IntentError::MissingApiKey(config.api_key_env.clone()))?;
        Ok(Self::new(config, api_key))
    }

    pub fn api_format(&self) -> ApiFormat {
        self.api_format
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, user: &str) -> Result<String, IntentError> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(user).await,
            ApiFormat::OpenAI => self.complete_openai(user).await,
        }
    }

    async fn complete_openai(&self, user: &str) -> Result<String, IntentError> {
        let request = CompletionRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| IntentError::Transport(e.to_string()))?;

        let completion: OpenAIResponse = decode(response).await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or(IntentError::EmptyResponse)
    }

    async fn complete_anthropic(&self, user: &str) -> Result<String, IntentError> {
        let request = CompletionRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(|e| IntentError::Transport(e.to_string()))?;

        let completion: AnthropicResponse = decode(response).await?;
        completion
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or(IntentError::EmptyResponse)
    }
}

async fn decode<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, IntentError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(IntentError::Status {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json()
        .await
        .map_err(|e| IntentError::Decode(e.to_string()))
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify(&self, prompt: &str) -> Result<Intent, IntentError> {
        let instruction = self.config.render_prompt(prompt);
        let raw = self.complete(&instruction).await?;
        let intent = Intent::normalize(&raw);
        tracing::debug!(model = %self.config.model, intent = %intent, "Prompt classified");
        Ok(intent)
    }
}

// Both providers accept the same request shape for a single user turn.
#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}
