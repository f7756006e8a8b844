//! Process wiring
//!
//! Loads settings, installs tracing, builds the providers and serves the
//! router until shutdown.

pub mod app;

pub use app::Application;
