//! Log message constants
//!
//! Centralizes the text of every log line so wording stays consistent across
//! the server, the orchestrator and the client. Variable parts are attached
//! as structured `tracing` fields, never formatted into the message.

/// Application startup and lifecycle messages
pub mod application {
    pub const STARTING: &str = "Starting glassbox";
    pub const LISTENING: &str = "Server listening";
    pub const CREDENTIAL_MISSING: &str =
        "No completion credential configured; analyze and discover will return 500";
    pub const SHUTDOWN_SIGNAL: &str = "Shutdown signal received";
    pub const SIGNAL_LISTENER_FAILED: &str =
        "Could not listen for ctrl-c; running until the process is killed";
    pub const STOPPED: &str = "Server stopped";
}

/// Request surface messages
pub mod api {
    pub const REQUEST_REJECTED: &str = "Request rejected";
    pub const STREAM_OPENED: &str = "Event stream opened";
}

/// Event stream encoding messages
pub mod encoding {
    pub const EVENT_UNSERIALIZABLE: &str = "Dropping event that failed to serialize";
}

/// Completion provider messages
pub mod provider {
    pub const COMPLETION_RECEIVED: &str = "Completion received";
}

/// Metadata fetcher messages
pub mod fetcher {
    pub const READ_DEGRADED: &str = "Upstream read degraded to empty";
    pub const BUNDLE_ASSEMBLED: &str = "Content bundle assembled";
}

/// Analysis run messages
pub mod analysis {
    pub const RUN_STARTED: &str = "Analysis run started";
    pub const BUNDLE_FAILED: &str = "Content bundle could not be assembled";
    pub const PASS_DISPATCHED: &str = "Pass dispatched";
    pub const PASS_COMPLETED: &str = "Pass completed";
    pub const PASS_PARSE_WARNING: &str = "Pass completed with unparseable payload";
    pub const PASS_FAILED: &str = "Pass failed";
    pub const PASS_PANICKED: &str = "Pass panicked";
    pub const RUN_FINISHED: &str = "Analysis run finished";
    pub const CLIENT_GONE: &str = "Event receiver dropped; stopping run";
}

/// Discovery run messages
pub mod discovery {
    pub const RUN_STARTED: &str = "Discovery run started";
    pub const COMPLETED: &str = "Discovery completed";
    pub const PARSE_FAILED: &str = "Discovery payload could not be parsed";
    pub const FAILED: &str = "Discovery completion failed";
}

/// Client-side session messages
pub mod client {
    pub const FRAME_DISCARDED: &str = "Malformed frame discarded";
    pub const STALE_EVENT_DROPPED: &str = "Event from superseded session dropped";
    pub const SESSION_STARTED: &str = "Session started";
    pub const CACHE_HIT: &str = "Serving analysis from local cache";
    pub const CACHE_READ_FAILED: &str = "Cache entry unreadable; treating as miss";
    pub const CACHE_WRITE_FAILED: &str = "Cache write failed";
    pub const CACHE_SCHEMA_MISMATCH: &str = "Cache entry has a different schema version";
    pub const CACHE_TASK_FAILED: &str = "Cache task did not finish; treating as miss";
}
