/// `load_config` module: Loads a static YAML config and injects secrets from the
/// environment, producing the core [`PipelineConfig`].
///
/// This module is the only place where untrusted YAML is parsed and mapped to the
/// strongly-typed configuration the pipeline consumes.
///
/// # Responsibilities
/// - Parse the YAML file (no secrets) into the intermediate `*Section` structs
/// - Fill every omitted value with the core defaults
/// - Inject `GHOST_ADMIN_API_KEY` (required) and `GROQ_API_KEY` (required only
///   for generation, see [`require_generation_key`]), and honour an optional
///   `GHOST_API_URL` override
/// - Fail with a message naming the missing variable, or "YAML" for parse errors
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{Context, Result};
use blogsmith_core::config::{
    ContentFormat, GenerationConfig, GhostConfig, PipelineConfig, DEFAULT_LIST_LIMIT,
};
use blogsmith_core::credential::SigningIdentity;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

pub const ADMIN_KEY_VAR: &str = "GHOST_ADMIN_API_KEY";
pub const GENERATION_KEY_VAR: &str = "GROQ_API_KEY";
pub const API_URL_VAR: &str = "GHOST_API_URL";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GhostSection {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub content_format: ContentFormat,
    pub accept_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationSection {
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    ghost: GhostSection,
    #[serde(default)]
    generation: GenerationSection,
    list_limit: Option<u32>,
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => {
            error!(variable = name, "Required environment variable is not set");
            Err(anyhow::anyhow!(
                "Missing required environment variable {name}"
            ))
        }
    }
}

/// Loads a static YAML config file (no secrets) and injects required env vars for secrets.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file is a valid config that relies on defaults and env.
    let raw: RawConfig = if config_content.trim().is_empty() {
        RawConfig::default()
    } else {
        match serde_yaml::from_str(&config_content) {
            Ok(conf) => {
                info!(config_path = ?path_ref, "Parsed config YAML successfully");
                conf
            }
            Err(e) => {
                error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
                return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
            }
        }
    };

    let api_url = match std::env::var(API_URL_VAR) {
        Ok(url) if !url.trim().is_empty() => {
            info!(variable = API_URL_VAR, "Ghost API URL overridden from environment");
            url
        }
        _ => raw.ghost.api_url.clone().ok_or_else(|| {
            anyhow::anyhow!("ghost.api_url is not set in the config and {API_URL_VAR} is not set")
        })?,
    };

    let admin_key = required_env(ADMIN_KEY_VAR)?;
    let identity = SigningIdentity::parse(&admin_key)
        .with_context(|| format!("Invalid {ADMIN_KEY_VAR}"))?;
    let generation_key = match std::env::var(GENERATION_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            info!(
                variable = GENERATION_KEY_VAR,
                "Generation key not set; only listing is available"
            );
            String::new()
        }
    };

    let mut ghost = GhostConfig::new(api_url);
    if let Some(secs) = raw.ghost.timeout_secs {
        ghost.timeout = Duration::from_secs(secs);
    }
    ghost.content_format = raw.ghost.content_format;
    ghost.accept_version = raw.ghost.accept_version;

    let mut generation = GenerationConfig::new(generation_key);
    if let Some(base_url) = raw.generation.base_url {
        generation.base_url = base_url;
    }
    if let Some(temperature) = raw.generation.temperature {
        generation.temperature = temperature;
    }
    if let Some(max_tokens) = raw.generation.max_tokens {
        generation.max_tokens = max_tokens;
    }
    if let Some(secs) = raw.generation.timeout_secs {
        generation.timeout = Duration::from_secs(secs);
    }

    let config = PipelineConfig {
        identity,
        ghost,
        generation,
        list_limit: raw.list_limit.unwrap_or(DEFAULT_LIST_LIMIT),
    };
    config.trace_loaded();
    Ok(config)
}

/// Commands that generate content call this before building the generation
/// client, so a missing key is reported by its variable name.
pub fn require_generation_key(config: &PipelineConfig) -> Result<()> {
    if config.generation.api_key.trim().is_empty() {
        error!(variable = GENERATION_KEY_VAR, "Required environment variable is not set");
        return Err(anyhow::anyhow!(
            "Missing required environment variable {GENERATION_KEY_VAR}"
        ));
    }
    Ok(())
}
