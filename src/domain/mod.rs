//! Domain types for repository analysis and discovery
//!
//! Everything here is plain data plus validation. Network access, prompt
//! text and streaming live in the layers above.

pub mod bundle;
pub mod discovery;
pub mod passes;
pub mod payloads;
pub mod repository;
pub mod types;
pub mod validation_constants;

pub use bundle::{BundleLimits, ContentBundle};
pub use discovery::{DiscoveryFilters, DiscoveryRequest, DiscoveryResult, RecommendedRepo};
pub use passes::{PassDefinition, PassName, PASS_DEFINITIONS};
pub use payloads::{AnalysisResults, DegradedPayload, PassReport, PassResult};
pub use repository::{RepoKey, RepositoryRef, RepositoryUrlError};
pub use types::*;
