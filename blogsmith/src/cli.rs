///
/// This module implements the CLI interface for blogsmith: command parsing,
/// argument validation and the async entrypoint shared by `main` and the tests.
///
/// All pipeline logic (prompting, generation, transformation, publishing) lives in
/// the [`blogsmith-core`] crate. This module only turns arguments into a
/// `GenerationRequest`, loads configuration and prints results.
///
/// ## Commands
/// - `publish`: generate an article for a topic and create it as a post
///   (`--dry-run` prints the prepared document instead)
/// - `posts`: list the most recent existing posts
/// - `models`: list the accepted model identifiers
///
/// [`blogsmith-core`]: ../../blogsmith_core/
use crate::load_config::{load_config, require_generation_key};
use anyhow::Result;
use blogsmith_core::contract::{
    GenerationRequest, Model, PostStatus, PostSummary, PublishDocument,
};
use blogsmith_core::generation::ChatCompletionsClient;
use blogsmith_core::ghost::GhostClient;
use blogsmith_core::pipeline::Pipeline;
use blogsmith_core::prompt::{Tone, DEFAULT_LANGUAGE};
use blogsmith_core::PipelineError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for blogsmith: draft blog posts with an LLM and publish them to Ghost.
#[derive(Parser)]
#[clap(
    name = "blogsmith",
    version,
    about = "Generate SEO-oriented blog posts with an LLM and publish them to a Ghost site"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a post for a topic and create it on the Ghost site
    Publish {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Subject of the article
        #[clap(long)]
        topic: String,
        /// Generation model identifier (see `blogsmith models`)
        #[clap(long, default_value = "llama-3.3-70b-versatile")]
        model: String,
        /// professional, casual, technical, educational or persuasive
        #[clap(long, default_value = "professional")]
        tone: String,
        /// Language code, e.g. en, de, ja
        #[clap(long, default_value = DEFAULT_LANGUAGE)]
        language: String,
        /// draft or published
        #[clap(long, default_value = "draft")]
        status: String,
        /// Extra tag, repeatable; placed ahead of keyword tags
        #[clap(long = "tag")]
        tags: Vec<String>,
        /// Leave `[related: ...]` placeholders unresolved
        #[clap(long)]
        no_internal_links: bool,
        /// Print the prepared document instead of publishing it
        #[clap(long)]
        dry_run: bool,
    },
    /// List the most recent posts on the Ghost site
    Posts {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Overrides `list_limit` from the config
        #[clap(long)]
        limit: Option<u32>,
    },
    /// List the accepted generation model identifiers
    Models,
}

/// One-line error report for stderr: `[ERROR] <kind>: <message>`.
pub fn error_line(err: &anyhow::Error) -> String {
    match err.downcast_ref::<PipelineError>() {
        Some(pipeline_err) => format!("[ERROR] {}: {err:#}", pipeline_err.kind()),
        None => format!("[ERROR] {err:#}"),
    }
}

fn build_request(
    topic: String,
    model: &str,
    tone: &str,
    language: String,
    status: &str,
    tags: Vec<String>,
    no_internal_links: bool,
) -> Result<GenerationRequest> {
    let model: Model = model.parse()?;
    let status: PostStatus = status.parse()?;
    let tone = Tone::from_code(tone);
    Ok(GenerationRequest::new(topic)?
        .with_model(model)
        .with_tone(tone)
        .with_language(language)
        .with_status(status)
        .with_tags(tags)
        .with_internal_links(!no_internal_links))
}

fn print_document(document: &PublishDocument) {
    println!("Title: {}", document.title);
    println!("Status: {}", document.status);
    println!("Tags: {}", document.tags.join(", "));
    if let Some(description) = &document.meta_description {
        println!("Meta description: {description}");
    }
    println!();
    println!("{}", document.rendered_content.as_str());
}

fn print_posts(posts: &[PostSummary]) {
    if posts.is_empty() {
        println!("No posts found.");
        return;
    }
    for post in posts {
        let published = post.published_at.as_deref().unwrap_or("unpublished");
        println!("{published}  {}  {}", post.title, post.url);
        if !post.tags.is_empty() {
            println!("    tags: {}", post.tags.join(", "));
        }
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("[CLI] trace_initialised");

    match cli.command {
        Commands::Publish {
            config,
            topic,
            model,
            tone,
            language,
            status,
            tags,
            no_internal_links,
            dry_run,
        } => {
            let request = build_request(
                topic,
                &model,
                &tone,
                language,
                &status,
                tags,
                no_internal_links,
            )?;
            let config = load_config(config)?;
            require_generation_key(&config)?;
            tracing::info!(command = "publish", dry_run, "[CLI] Starting pipeline");

            let generator = ChatCompletionsClient::new(&config.generation)?;
            let publisher = GhostClient::new(&config.ghost)?;
            let pipeline = Pipeline::new(config, generator, publisher);

            if dry_run {
                let document = pipeline.prepare_document(&request).await?;
                print_document(&document);
            } else {
                let outcome = pipeline.generate_and_publish(&request).await?;
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
            Ok(())
        }
        Commands::Posts { config, limit } => {
            let mut config = load_config(config)?;
            if let Some(limit) = limit {
                config.list_limit = limit;
            }
            tracing::info!(command = "posts", limit = config.list_limit, "[CLI] Listing posts");

            let publisher = GhostClient::new(&config.ghost)?;
            let pipeline = Pipeline::new(config, (), publisher);

            let posts = pipeline.list_existing_posts().await?;
            print_posts(&posts);
            Ok(())
        }
        Commands::Models => {
            tracing::info!(command = "models", "[CLI] Listing models");
            for model in Model::ALL {
                println!("{}", model.id());
            }
            Ok(())
        }
    }
}
