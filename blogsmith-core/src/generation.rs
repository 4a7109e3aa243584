//! [`Generator`] over an OpenAI-compatible chat-completions endpoint (Groq by
//! default).
//!
//! One system message fixes the persona, one user message carries the prompt,
//! and the backend is asked for a single JSON object. The model identifier is
//! passed through as-is; an unknown model surfaces as the backend's error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::{GenerationConfig, DEFAULT_CONNECT_TIMEOUT_SECS};
use crate::contract::Generator;
use crate::error::{PipelineError, PipelineResult};
use crate::prompt::ResponseSchema;

pub const SYSTEM_PERSONA: &str =
    "You are an expert blog writer who creates engaging, informative, and SEO-optimized content.";

pub struct ChatCompletionsClient {
    client: Client,
    endpoint: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsClient {
    pub fn new(config: &GenerationConfig) -> PipelineResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "generation API key is empty".into(),
            ));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("blogsmith/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                PipelineError::Configuration(format!("failed to build generation HTTP client: {e}"))
            })?;

        info!(
            base_url = %config.base_url,
            timeout_secs = config.timeout.as_secs(),
            api_key_set = true,
            "Initialized chat-completions client"
        );
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl Generator for ChatCompletionsClient {
    async fn generate(
        &self,
        prompt_text: &str,
        model: &str,
        schema: &ResponseSchema,
    ) -> PipelineResult<String> {
        let body = ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PERSONA,
                },
                ChatMessage {
                    role: "user",
                    content: prompt_text,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        info!(
            model,
            endpoint = %self.endpoint,
            expected_keys = schema.keys.len(),
            "Requesting generation"
        );
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, model, "Generation request failed in transport");
                PipelineError::transport(e)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(PipelineError::transport)?;
        if !status.is_success() {
            error!(status = %status, model, "Generation backend returned error. Response body: {text}");
            return Err(PipelineError::Upstream {
                status: Some(status.as_u16()),
                body: text,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = ?e, "Generation response is not a chat-completions envelope");
            PipelineError::ResponseShape(format!("generation response envelope: {e}"))
        })?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                error!(model, "Generation response has no message content");
                PipelineError::ResponseShape("generation response has no choices[0].message.content".into())
            })?;

        debug!(model, chars = content.len(), "Generation completed");
        Ok(content)
    }
}
