//! High-level pipeline: orchestrates prompt → generate → parse → transform → publish.
//!
//! [`Pipeline`] owns the configuration and the two remote collaborators, each
//! behind a trait from [`crate::contract`]. A single invocation is strictly
//! sequential and fail-fast:
//!   - build the prompt from the request
//!   - ask the [`Generator`] for one JSON payload and parse it
//!   - resolve internal links, render, and derive tags
//!   - sign a fresh admin credential and hand the document to the [`Publisher`]
//!
//! Nothing is retried and nothing is persisted. A parse failure stops the run
//! before the publisher is contacted.
//!
//! # Navigation
//! - Main entrypoint: [`Pipeline::generate_and_publish`]
//! - Dry runs: [`Pipeline::prepare_document`]
//! - Listing: [`Pipeline::list_existing_posts`]

use chrono::Utc;
use tracing::{debug, error, info};

use crate::config::PipelineConfig;
use crate::contract::{
    GenerationRequest, GenerationResult, Generator, ListQuery, PostSummary, PublishDocument,
    PublishOutcome, Publisher,
};
use crate::credential::SignedCredential;
use crate::error::PipelineResult;
use crate::prompt::build_prompt;
use crate::transform::transform;

pub struct Pipeline<G, P> {
    config: PipelineConfig,
    generator: G,
    publisher: P,
}

impl<G, P> Pipeline<G, P> {
    pub fn new(config: PipelineConfig, generator: G, publisher: P) -> Self {
        Self {
            config,
            generator,
            publisher,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn fresh_credential(&self) -> PipelineResult<SignedCredential> {
        let credential = self.config.identity.sign(Utc::now())?;
        debug!(
            key_id = self.config.identity.key_id(),
            expires_at = %credential.expires_at(),
            "[PIPELINE] Signed fresh admin credential"
        );
        Ok(credential)
    }
}

/// Listing only talks to the publisher, so any generator type (including `()`)
/// will do.
impl<G, P> Pipeline<G, P>
where
    P: Publisher,
{
    /// Most recent posts first, capped at the configured list limit.
    pub async fn list_existing_posts(&self) -> PipelineResult<Vec<PostSummary>> {
        let credential = self.fresh_credential()?;
        let query = ListQuery {
            limit: self.config.list_limit,
            newest_first: true,
        };
        info!(limit = query.limit, "[PIPELINE] Listing existing posts");
        let posts = self
            .publisher
            .list_posts(query, &credential)
            .await
            .map_err(|e| {
                error!(error = %e, "[PIPELINE][ERROR] Listing posts failed");
                e
            })?;
        info!(count = posts.len(), "[PIPELINE] Listed existing posts");
        Ok(posts)
    }
}

impl<G, P> Pipeline<G, P>
where
    G: Generator,
    P: Publisher,
{
    /// Run every step up to, but not including, publication.
    pub async fn prepare_document(
        &self,
        request: &GenerationRequest,
    ) -> PipelineResult<PublishDocument> {
        info!(
            topic = request.topic(),
            model = %request.model,
            tone = %request.tone,
            language = %request.language,
            "[PIPELINE] Preparing document"
        );

        let prompt = build_prompt(request.topic(), request.tone, &request.language);
        let raw = self
            .generator
            .generate(&prompt.text, request.model.id(), &prompt.schema)
            .await
            .map_err(|e| {
                error!(error = %e, "[PIPELINE][GENERATE][ERROR] Generation failed");
                e
            })?;
        debug!(chars = raw.len(), "[PIPELINE][GENERATE] Received raw payload");

        let result = GenerationResult::parse(&raw, request.topic()).map_err(|e| {
            error!(error = %e, "[PIPELINE][GENERATE][ERROR] Payload is not a valid article");
            e
        })?;
        info!(
            title = %result.title,
            keywords = result.keywords.len(),
            link_topics = result.internal_link_topics.len(),
            "[PIPELINE][GENERATE] Parsed article"
        );

        let transformed = transform(
            &result,
            request.want_internal_links,
            &request.tags,
            self.config.ghost.content_format,
        );
        let meta_description =
            Some(result.meta_description).filter(|description| !description.is_empty());

        Ok(PublishDocument {
            title: result.title,
            rendered_content: transformed.rendered,
            status: request.status,
            meta_description,
            tags: transformed.tags,
        })
    }

    pub async fn generate_and_publish(
        &self,
        request: &GenerationRequest,
    ) -> PipelineResult<PublishOutcome> {
        info!("[PIPELINE] Starting generate-and-publish run");
        let document = self.prepare_document(request).await?;

        let credential = self.fresh_credential()?;
        info!(
            title = %document.title,
            status = %document.status,
            tags = ?document.tags,
            "[PIPELINE][PUBLISH] Submitting document"
        );
        let outcome = self
            .publisher
            .create_post(&document, &credential)
            .await
            .map_err(|e| {
                error!(error = %e, "[PIPELINE][PUBLISH][ERROR] Publication failed");
                e
            })?;

        info!(
            post_id = %outcome.post_id,
            url = %outcome.post_url,
            "[PIPELINE] Published post"
        );
        Ok(outcome)
    }
}
