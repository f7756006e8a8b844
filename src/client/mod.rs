//! Client side of the event stream
//!
//! Decodes frames incrementally, folds them into session state, rejects
//! events from superseded sessions and keeps finished analyses in a local
//! cache.

pub mod cache;
pub mod frames;
pub mod http;
pub mod reducer;
pub mod session;

pub use cache::{CacheEntry, FileResultCache, MemoryResultCache, ResultCache, CACHE_SCHEMA_VERSION};
pub use frames::{parse_frame_line, FrameDecoder};
pub use http::GlassboxClient;
pub use reducer::{
    reduce_analysis, reduce_discovery, AnalysisState, AnalysisStatus, DiscoveryState,
    DiscoveryStatus,
};
pub use session::{SessionController, SessionId};
