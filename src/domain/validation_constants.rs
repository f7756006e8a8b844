//! Validation constants for domain types
//!
//! This module centralizes the limits and magic numbers used throughout the
//! domain layer so the request surface, the fetcher, and the client agree.

/// Discovery request constants
pub mod discovery {
    /// Minimum characters in a discovery query
    pub const MIN_QUERY_CHARS: usize = 10;

    /// Default number of recommendations
    pub const DEFAULT_MAX_RESULTS: u8 = 5;

    /// Inclusive upper bound on requested recommendations
    pub const MAX_RESULTS_LIMIT: u8 = 10;
}

/// Repository URL constants
pub mod repository {
    /// Pattern for a full repository URL, optional trailing slash
    pub const URL_PATTERN: &str = r"^https?://github\.com/([\w.\-]+)/([\w.\-]+)/?$";

    /// Pattern used to pull `owner/repo` out of any URL mentioning GitHub
    pub const KEY_PATTERN: &str = r"github\.com/([^/]+/[^/]+)";

    /// Suffix stripped from repository names and cache keys
    pub const GIT_SUFFIX: &str = ".git";
}

/// Prompt construction limits
pub mod prompt {
    /// File paths included in a prompt
    pub const MAX_TREE_LINES: usize = 200;

    /// Languages listed in a prompt
    pub const MAX_LANGUAGES: usize = 10;

    /// Characters of a malformed completion echoed back in a degraded payload
    pub const MAX_RAW_ECHO_CHARS: usize = 500;
}

/// Client state limits
pub mod client_state {
    /// Trailing reasoning steps kept for progressive display
    pub const REASONING_WINDOW: usize = 8;
}
