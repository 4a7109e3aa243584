//! Turns a parsed [`GenerationResult`] into publishable content.
//!
//! Three deterministic steps: resolve `[related: <topic>]` placeholders into
//! internal links, render the markdown to HTML, and wrap it in the container the
//! target expects. Keyword-derived tags are computed alongside. Nothing here
//! fails; malformed markdown renders best-effort.
//!
//! The link slugs are a heuristic: they are not checked against the target's
//! real routing or existing posts.

use pulldown_cmark::{html, Event, Options, Parser};
use serde_json::json;
use tracing::debug;

use crate::config::ContentFormat;
use crate::contract::{GenerationResult, RenderedContent};

/// Only the first this-many internal-link topics are resolved.
pub const MAX_LINKED_TOPICS: usize = 3;

/// Only the first this-many keywords become tags.
pub const MAX_KEYWORD_TAGS: usize = 5;

pub const INTERNAL_LINK_PREFIX: &str = "/blog/";

pub const MOBILEDOC_VERSION: &str = "0.3.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedContent {
    pub rendered: RenderedContent,
    pub tags: Vec<String>,
}

pub fn transform(
    result: &GenerationResult,
    linking_enabled: bool,
    explicit_tags: &[String],
    format: ContentFormat,
) -> TransformedContent {
    let markdown = if linking_enabled {
        resolve_internal_links(&result.content_markdown, &result.internal_link_topics)
    } else {
        result.content_markdown.clone()
    };

    let html = render_markdown(&markdown);
    let rendered = match format {
        ContentFormat::Mobiledoc => RenderedContent::Mobiledoc(wrap_mobiledoc(&html)),
        ContentFormat::Html => RenderedContent::Html(html),
    };
    let tags = derive_tags(explicit_tags, &result.keywords);

    debug!(
        linking_enabled,
        tags = tags.len(),
        format = ?format,
        "Transformed generated content"
    );
    TransformedContent { rendered, tags }
}

/// Lower-cases the topic and replaces spaces with hyphens.
pub fn slugify(topic: &str) -> String {
    topic.to_lowercase().replace(' ', "-")
}

pub fn internal_link_href(topic: &str) -> String {
    format!("{INTERNAL_LINK_PREFIX}{}/", slugify(topic))
}

/// Replace the first occurrence of `[related: <topic>]` for each of the first
/// [`MAX_LINKED_TOPICS`] topics. Everything else is left as written.
pub fn resolve_internal_links(markdown: &str, topics: &[String]) -> String {
    let mut resolved = markdown.to_string();
    for topic in topics.iter().take(MAX_LINKED_TOPICS) {
        let placeholder = format!("[related: {topic}]");
        if resolved.contains(&placeholder) {
            let link = format!("[{topic}]({})", internal_link_href(topic));
            resolved = resolved.replacen(&placeholder, &link, 1);
        }
    }
    resolved
}

/// Render markdown to HTML. Supports tables, strikethrough, task lists and
/// fenced code (emitted with a `language-*` class). Single newlines inside a
/// paragraph are kept as `<br />`.
pub fn render_markdown(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });
    let mut rendered = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut rendered, events);
    rendered
}

/// Fixed container template: version tag plus one HTML card referenced by a
/// single card section.
pub fn wrap_mobiledoc(html: &str) -> String {
    json!({
        "version": MOBILEDOC_VERSION,
        "atoms": [],
        "cards": [["html", { "html": html }]],
        "markups": [],
        "sections": [[10, 0]],
    })
    .to_string()
}

/// Explicit tags first, then the first [`MAX_KEYWORD_TAGS`] keywords, with exact
/// (case-sensitive) de-duplication. Empty strings are dropped.
pub fn derive_tags(explicit: &[String], keywords: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let candidates = explicit
        .iter()
        .chain(keywords.iter().take(MAX_KEYWORD_TAGS));
    for candidate in candidates {
        if candidate.is_empty() || tags.contains(candidate) {
            continue;
        }
        tags.push(candidate.clone());
    }
    tags
}
