use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::credential::SigningIdentity;

pub const DEFAULT_GHOST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_GENERATION_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 8000;
pub const DEFAULT_LIST_LIMIT: u32 = 15;

/// Immutable process-wide configuration handed to the pipeline and clients.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub identity: SigningIdentity,
    pub ghost: GhostConfig,
    pub generation: GenerationConfig,
    pub list_limit: u32,
}

impl PipelineConfig {
    pub fn trace_loaded(&self) {
        info!(
            ghost_url = %self.ghost.api_url,
            key_id = self.identity.key_id(),
            generation_url = %self.generation.base_url,
            content_format = ?self.ghost.content_format,
            "Loaded PipelineConfig"
        );
        debug!(?self, "PipelineConfig loaded (full debug)");
    }
}

/// Which rich-content field the publisher submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    /// Versioned container document embedding one HTML card.
    #[default]
    Mobiledoc,
    /// Raw HTML, converted by the target on ingest.
    Html,
}

#[derive(Debug, Clone)]
pub struct GhostConfig {
    /// Site root, e.g. `https://blog.example.com`. A trailing slash is ignored.
    pub api_url: String,
    pub timeout: Duration,
    pub content_format: ContentFormat,
    /// Sent as `Accept-Version` when set.
    pub accept_version: Option<String>,
}

impl GhostConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout: Duration::from_secs(DEFAULT_GHOST_TIMEOUT_SECS),
            content_format: ContentFormat::default(),
            accept_version: None,
        }
    }

    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

#[derive(Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key_set", &!self.api_key.is_empty())
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GenerationConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_GENERATION_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_debug_hides_api_key() {
        let config = GenerationConfig::new("gsk_live_secret");
        let printed = format!("{config:?}");
        assert!(!printed.contains("gsk_live_secret"));
        assert!(printed.contains("api_key_set: true"));
    }

    #[test]
    fn ghost_base_url_drops_trailing_slash() {
        let config = GhostConfig::new("https://blog.example.com/");
        assert_eq!(config.base_url(), "https://blog.example.com");
        assert_eq!(config.content_format, ContentFormat::Mobiledoc);
    }
}
