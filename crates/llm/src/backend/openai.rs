use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::transport::{authorize, build_client, send_json, with_retries};
use super::{FinishReason, GenerationResult, HttpBackendConfig, LlmBackend};
use crate::prompt::{Message, Role};
use crate::LlmError;

pub(crate) const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

/// Backend for `/chat/completions` servers (OpenAI, vLLM, LM Studio, ...)
pub struct OpenAIBackend {
    client: Client,
    config: HttpBackendConfig,
}

impl OpenAIBackend {
    /// Remote endpoints need an API key; loopback servers do not
    pub fn new(config: HttpBackendConfig) -> Result<Self, LlmError> {
        let has_key = config.api_key.as_deref().is_some_and(|k| !k.is_empty());
        if !has_key && !is_loopback(&config.endpoint) {
            return Err(LlmError::Configuration(format!(
                "API key required for {}",
                config.endpoint
            )));
        }

        let client = build_client(&config)?;
        Ok(Self { client, config })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url())
    }
}

/// Text-marker tool results carry no `tool_call_id`, which the `tool` role requires here
fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User | Role::Tool => "user",
        Role::Assistant => "assistant",
    }
}

fn is_loopback(endpoint: &str) -> bool {
    ["http://localhost", "http://127.0.0.1"]
        .iter()
        .any(|prefix| endpoint.starts_with(prefix))
}

#[async_trait]
impl LlmBackend for OpenAIBackend {
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        let started = Instant::now();
        let body = CompletionRequest {
            model: &self.config.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: wire_role(m.role).to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let reply: CompletionResponse = with_retries(
            self.config.max_retries,
            self.config.initial_backoff,
            || send_json(authorize(self.client.post(self.url()).json(&body), &self.config)),
        )
        .await?;

        let tokens = reply.usage.map(|u| u.completion_tokens).unwrap_or(0);
        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("Completion had no choices".to_string()))?;

        Ok(GenerationResult {
            text: choice.message.content,
            tokens,
            total_time_ms: started.elapsed().as_millis() as u64,
            finish_reason: match choice.finish_reason.as_deref() {
                Some("length") => FinishReason::Length,
                Some("content_filter") => FinishReason::Error,
                _ => FinishReason::Stop,
            },
        })
    }

    async fn is_available(&self) -> bool {
        let request = authorize(
            self.client.get(format!("{}/models", self.config.base_url())),
            &self.config,
        );
        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: WireMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    completion_tokens: usize,
}
