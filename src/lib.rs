//! Glassbox - streamed, multi-pass LLM reports on open-source repositories
//!
//! A server fans six analysis passes over a repository's content bundle out
//! to a completion provider and streams each result as it settles. A client
//! folds that stream into session state and caches finished analyses.
//! Discovery mode recommends repositories for a free-text request.

pub mod api;
pub mod application;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod prompts;
pub mod providers;
pub mod streaming;

pub use application::Application;
pub use error::{Error, Result};
