//! # Ghost publisher
//!
//! Wires the [`Publisher`] trait to the Ghost admin API:
//!
//! - `create_post` → `POST /ghost/api/admin/posts/` (with `?source=html` when the
//!   document carries raw HTML)
//! - `list_posts` → `GET /ghost/api/admin/posts/?limit=…&fields=…&include=tags`
//!
//! Every request carries `Authorization: Ghost <token>` from the credential the
//! caller just signed. Any non-2xx answer is an [`PipelineError::Upstream`]
//! carrying the status and body; nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::{GhostConfig, DEFAULT_CONNECT_TIMEOUT_SECS};
use crate::contract::{
    ListQuery, PostStatus, PostSummary, PublishDocument, PublishOutcome, Publisher,
    RenderedContent,
};
use crate::credential::SignedCredential;
use crate::error::{PipelineError, PipelineResult};

pub const POSTS_PATH: &str = "/ghost/api/admin/posts/";

/// Post fields requested when listing.
pub const LIST_FIELDS: &str = "id,title,slug,custom_excerpt,published_at,url";

pub struct GhostClient {
    client: Client,
    base_url: String,
    accept_version: Option<String>,
}

#[derive(Serialize)]
struct PostsEnvelope<'a> {
    posts: [NewPost<'a>; 1],
}

#[derive(Serialize)]
struct NewPost<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mobiledoc: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    status: PostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta_description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_excerpt: Option<&'a str>,
    tags: Vec<TagRef<'a>>,
}

#[derive(Serialize)]
struct TagRef<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct PostsResponse<T> {
    #[serde(default = "Vec::new")]
    posts: Vec<T>,
}

#[derive(Deserialize)]
struct CreatedPost {
    id: String,
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize)]
struct ListedPost {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    custom_excerpt: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    tags: Vec<ListedTag>,
}

#[derive(Deserialize)]
struct ListedTag {
    name: String,
}

impl<'a> NewPost<'a> {
    fn from_document(document: &'a PublishDocument) -> Self {
        let (mobiledoc, html) = match &document.rendered_content {
            RenderedContent::Mobiledoc(doc) => (Some(doc.as_str()), None),
            RenderedContent::Html(html) => (None, Some(html.as_str())),
        };
        let description = document.meta_description.as_deref();
        Self {
            title: &document.title,
            mobiledoc,
            html,
            status: document.status,
            meta_description: description,
            custom_excerpt: description,
            tags: document
                .tags
                .iter()
                .map(|name| TagRef { name })
                .collect(),
        }
    }
}

impl GhostClient {
    pub fn new(config: &GhostConfig) -> PipelineResult<Self> {
        let base_url = config.base_url();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(PipelineError::Configuration(format!(
                "Ghost API URL must start with http:// or https://, got {:?}",
                config.api_url
            )));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("blogsmith/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                PipelineError::Configuration(format!("failed to build Ghost HTTP client: {e}"))
            })?;
        info!(
            base_url,
            timeout_secs = config.timeout.as_secs(),
            "Initialized Ghost client"
        );
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            accept_version: config.accept_version.clone(),
        })
    }

    fn posts_url(&self) -> String {
        format!("{}{}", self.base_url, POSTS_PATH)
    }

    fn authorized(
        &self,
        builder: RequestBuilder,
        credential: &SignedCredential,
    ) -> PipelineResult<RequestBuilder> {
        if credential.is_expired_at(Utc::now()) {
            return Err(PipelineError::Configuration(
                "admin credential expired before use; sign a fresh one per request".into(),
            ));
        }
        let builder = builder.header(AUTHORIZATION, credential.authorization_header());
        Ok(match &self.accept_version {
            Some(version) => builder.header("Accept-Version", version),
            None => builder,
        })
    }

    async fn success_body(response: Response, operation: &str) -> PipelineResult<String> {
        let status = response.status();
        let text = response.text().await.map_err(PipelineError::transport)?;
        if !status.is_success() {
            error!(
                status = %status,
                operation,
                "Ghost API returned error. Response body: {text}"
            );
            return Err(PipelineError::Upstream {
                status: Some(status.as_u16()),
                body: text,
            });
        }
        Ok(text)
    }

    fn derived_url(&self, slug: &str) -> String {
        format!("{}/{}/", self.base_url, slug)
    }
}

#[async_trait]
impl Publisher for GhostClient {
    async fn create_post(
        &self,
        document: &PublishDocument,
        credential: &SignedCredential,
    ) -> PipelineResult<PublishOutcome> {
        let envelope = PostsEnvelope {
            posts: [NewPost::from_document(document)],
        };
        let mut request = self.client.post(self.posts_url());
        if matches!(document.rendered_content, RenderedContent::Html(_)) {
            request = request.query(&[("source", "html")]);
        }
        let request = self.authorized(request, credential)?.json(&envelope);

        info!(
            title = %document.title,
            status = %document.status,
            tags = document.tags.len(),
            "Creating Ghost post"
        );
        let response = request.send().await.map_err(|e| {
            error!(error = ?e, "Ghost create_post failed in transport");
            PipelineError::transport(e)
        })?;
        let text = Self::success_body(response, "create_post").await?;

        let parsed: PostsResponse<CreatedPost> = serde_json::from_str(&text).map_err(|e| {
            error!(error = ?e, "Ghost create_post response has unexpected shape");
            PipelineError::ResponseShape(format!("create_post response: {e}"))
        })?;
        let created = parsed.posts.into_iter().next().ok_or_else(|| {
            PipelineError::ResponseShape("create_post response has no posts[0]".into())
        })?;

        let status = match created.status.as_deref() {
            Some(remote) => remote.parse::<PostStatus>().unwrap_or_else(|_| {
                warn!(remote, "Unrecognised post status from Ghost, keeping requested status");
                document.status
            }),
            None => document.status,
        };
        let outcome = PublishOutcome {
            post_id: created.id,
            post_url: created.url,
            title: created.title.unwrap_or_else(|| document.title.clone()),
            status,
        };
        info!(post_id = %outcome.post_id, url = %outcome.post_url, "Successfully created Ghost post");
        Ok(outcome)
    }

    async fn list_posts(
        &self,
        query: ListQuery,
        credential: &SignedCredential,
    ) -> PipelineResult<Vec<PostSummary>> {
        let mut params: Vec<(&str, String)> = vec![
            ("limit", query.limit.to_string()),
            ("fields", LIST_FIELDS.to_string()),
            ("include", "tags".to_string()),
        ];
        if query.newest_first {
            params.push(("order", "published_at desc".to_string()));
        }
        let request = self
            .authorized(self.client.get(self.posts_url()), credential)?
            .query(&params);

        info!(limit = query.limit, newest_first = query.newest_first, "Listing Ghost posts");
        let response = request.send().await.map_err(|e| {
            error!(error = ?e, "Ghost list_posts failed in transport");
            PipelineError::transport(e)
        })?;
        let text = Self::success_body(response, "list_posts").await?;

        let parsed: PostsResponse<ListedPost> = serde_json::from_str(&text).map_err(|e| {
            error!(error = ?e, "Ghost list_posts response has unexpected shape");
            PipelineError::ResponseShape(format!("list_posts response: {e}"))
        })?;

        let summaries: Vec<PostSummary> = parsed
            .posts
            .into_iter()
            .map(|post| {
                let slug = post.slug.unwrap_or_default();
                let url = post.url.unwrap_or_else(|| self.derived_url(&slug));
                PostSummary {
                    id: post.id,
                    title: post.title.unwrap_or_default(),
                    slug,
                    excerpt: post.custom_excerpt,
                    published_at: post.published_at,
                    tags: post.tags.into_iter().map(|t| t.name).collect(),
                    url,
                }
            })
            .collect();
        debug!(count = summaries.len(), "Fetched Ghost posts");
        Ok(summaries)
    }
}
