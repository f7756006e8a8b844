//! Constants for upstream API interactions
//!
//! String literals, header names and JSON field names used by the completion
//! provider and the repository fetcher live here so neither implementation
//! repeats them.

/// Anthropic Messages API
pub mod anthropic {
    pub const MESSAGES_PATH: &str = "/v1/messages";
    pub const API_VERSION: &str = "2023-06-01";

    pub mod headers {
        pub const API_KEY: &str = "x-api-key";
        pub const VERSION: &str = "anthropic-version";
    }

    /// `type` values of response content blocks
    pub mod block_types {
        pub const TEXT: &str = "text";
    }

    pub const USER_ROLE: &str = "user";
}

/// GitHub REST API and raw content host
pub mod github {
    pub const ACCEPT: &str = "application/vnd.github.v3+json";
    pub const TOKEN_SCHEME: &str = "token";
    pub const USER_AGENT: &str = concat!("glassbox/", env!("CARGO_PKG_VERSION"));
    pub const README_PATH: &str = "HEAD/README.md";
    pub const TREE_PATH: &str = "git/trees/HEAD?recursive=1";

    /// Response body fields
    pub mod json_fields {
        pub const DESCRIPTION: &str = "description";
        pub const TREE: &str = "tree";
        pub const PATH: &str = "path";
        pub const CONTENT: &str = "content";
    }

    /// Root-level files whose contents are read into the bundle, in the order
    /// they are preferred when the cap is reached
    pub const PRIORITY_FILES: &[&str] = &[
        "package.json",
        "requirements.txt",
        "pyproject.toml",
        "setup.py",
        "setup.cfg",
        "Cargo.toml",
        "go.mod",
        "Gemfile",
        "docker-compose.yml",
        "docker-compose.yaml",
        "Dockerfile",
        ".env.example",
        "Makefile",
        "tsconfig.json",
        "webpack.config.js",
        "vite.config.ts",
        "next.config.js",
        "next.config.mjs",
    ];
}

/// HTTP-related constants
pub mod http {
    pub mod content_types {
        pub const APPLICATION_JSON: &str = "application/json";
        pub const TEXT_EVENT_STREAM: &str = "text/event-stream";
    }

    pub mod headers {
        pub const NO_CACHE: &str = "no-cache";
    }
}
