#![doc = "blogsmith-core: core logic library for blogsmith."]

//! This crate holds the whole draft-and-publish pipeline: prompt construction,
//! the generation and Ghost clients, content transformation and admin-credential
//! signing. The CLI crate only loads configuration and wires these together.
//!
//! # Usage
//! Build a [`config::PipelineConfig`], pick a [`contract::Generator`] and a
//! [`contract::Publisher`] (the concrete [`generation::ChatCompletionsClient`]
//! and [`ghost::GhostClient`], or the mocks under `test-export-mocks`), and drive
//! a [`pipeline::Pipeline`].

pub mod config;
pub mod contract;
pub mod credential;
pub mod error;
pub mod generation;
pub mod ghost;
pub mod pipeline;
pub mod prompt;
pub mod transform;

pub use error::{PipelineError, PipelineResult};
