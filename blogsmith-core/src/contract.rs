#![allow(unused)]

//! # contract: data model and the two remote seams of the pipeline
//!
//! The pipeline talks to exactly two remote systems, each behind a trait:
//!
//! - [`Generator`]: a text-generation backend that answers one prompt with one
//!   JSON payload.
//! - [`Publisher`]: the target content system (Ghost admin API) that creates and
//!   lists posts.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`, exported under the
//!   `test-export-mocks` feature so downstream crates can drive the pipeline with
//!   fakes for both collaborators.
//!
//! ## Types
//! - Request and response types are plain data. Everything here lives for a single
//!   pipeline invocation; nothing is persisted.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use mockall::{automock, predicate::*};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::credential::SignedCredential;
use crate::error::{PipelineError, PipelineResult};
use crate::prompt::{ResponseSchema, Tone, DEFAULT_LANGUAGE};

/// Generation models accepted at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Model {
    #[default]
    Llama33_70bVersatile,
    Llama31_8bInstant,
    Llama4Maverick,
    Llama4Scout,
    GptOss120b,
    Qwen3_32b,
}

impl Model {
    pub const ALL: [Model; 6] = [
        Model::Llama33_70bVersatile,
        Model::Llama31_8bInstant,
        Model::Llama4Maverick,
        Model::Llama4Scout,
        Model::GptOss120b,
        Model::Qwen3_32b,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Model::Llama33_70bVersatile => "llama-3.3-70b-versatile",
            Model::Llama31_8bInstant => "llama-3.1-8b-instant",
            Model::Llama4Maverick => "meta-llama/llama-4-maverick-17b-128e-instruct",
            Model::Llama4Scout => "meta-llama/llama-4-scout-17b-16e-instruct",
            Model::GptOss120b => "openai/gpt-oss-120b",
            Model::Qwen3_32b => "qwen/qwen3-32b",
        }
    }
}

impl FromStr for Model {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| PipelineError::InvalidRequest(format!("unsupported model: {s}")))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl FromStr for PostStatus {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(PipelineError::InvalidRequest(format!(
                "unsupported status: {other} (expected draft or published)"
            ))),
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated request to draft and publish one post. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    topic: String,
    pub model: Model,
    pub tone: Tone,
    /// Language code; unsupported codes degrade in the prompt text.
    pub language: String,
    pub want_internal_links: bool,
    pub status: PostStatus,
    /// Tags supplied by the caller, kept ahead of keyword-derived tags.
    pub tags: Vec<String>,
}

impl GenerationRequest {
    /// Builds a request with default model, tone, language and draft status.
    pub fn new(topic: impl Into<String>) -> PipelineResult<Self> {
        let topic = topic.into();
        let trimmed = topic.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::InvalidRequest("topic is required".into()));
        }
        Ok(Self {
            topic: trimmed.to_string(),
            model: Model::default(),
            tone: Tone::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            want_internal_links: true,
            status: PostStatus::default(),
            tags: Vec::new(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_internal_links(mut self, enabled: bool) -> Self {
        self.want_internal_links = enabled;
        self
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Structured article returned by the generation backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResult {
    pub title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub content_markdown: String,
    pub internal_link_topics: Vec<String>,
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Keeps the string entries of an array field; any other shape yields nothing.
fn string_list_field(object: &Map<String, Value>, key: &str) -> Vec<String> {
    match object.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

impl GenerationResult {
    /// Parse the backend's raw text. Absent or mistyped keys default; a blank or
    /// missing title falls back to `topic`. Only text that is not a JSON object is
    /// a [`PipelineError::Parse`].
    pub fn parse(raw: &str, topic: &str) -> PipelineResult<Self> {
        let value: Value =
            serde_json::from_str(raw.trim()).map_err(|e| PipelineError::Parse(e.to_string()))?;
        let Value::Object(object) = value else {
            return Err(PipelineError::Parse("expected a JSON object".into()));
        };

        let title = string_field(&object, "title")
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| topic.to_string());

        Ok(Self {
            title,
            meta_description: string_field(&object, "meta_description").unwrap_or_default(),
            keywords: string_list_field(&object, "keywords"),
            content_markdown: string_field(&object, "content").unwrap_or_default(),
            internal_link_topics: string_list_field(&object, "internal_links"),
        })
    }
}

/// Rich content ready for submission, in the form the target expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedContent {
    /// Serialized container document embedding a single HTML card.
    Mobiledoc(String),
    Html(String),
}

impl RenderedContent {
    pub fn as_str(&self) -> &str {
        match self {
            RenderedContent::Mobiledoc(doc) => doc,
            RenderedContent::Html(html) => html,
        }
    }
}

/// The post exactly as it will be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishDocument {
    pub title: String,
    pub rendered_content: RenderedContent,
    pub status: PostStatus,
    pub meta_description: Option<String>,
    /// Case-sensitive, de-duplicated, in insertion order.
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
    pub post_id: String,
    pub post_url: String,
    pub title: String,
    pub status: PostStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub published_at: Option<String>,
    pub tags: Vec<String>,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: u32,
    pub newest_first: bool,
}

/// Text-generation backend answering one prompt with one JSON payload.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    /// Single-turn generation. Returns the raw text the backend produced; the
    /// caller parses it.
    async fn generate(
        &self,
        prompt_text: &str,
        model: &str,
        schema: &ResponseSchema,
    ) -> PipelineResult<String>;
}

/// Target content system.
///
/// Every call takes a freshly signed credential; implementors must not cache it.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Create one post and return what the target echoed back.
    async fn create_post(
        &self,
        document: &PublishDocument,
        credential: &SignedCredential,
    ) -> PipelineResult<PublishOutcome>;

    /// Fetch existing posts for display.
    async fn list_posts(
        &self,
        query: ListQuery,
        credential: &SignedCredential,
    ) -> PipelineResult<Vec<PostSummary>>;
}
