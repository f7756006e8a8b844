//! Server-side event production: the pass orchestrator, the discovery
//! runner, and the frame encoding shared by both streams.

pub mod discovery;
pub mod encoder;
pub mod events;
pub mod fences;
pub mod orchestrator;

pub use discovery::DiscoveryRunner;
pub use encoder::{encode_frame, frame_stream, DATA_PREFIX};
pub use events::{AnalysisEvent, DiscoveryEvent};
pub use orchestrator::{stream_passes, AnalysisOrchestrator};
