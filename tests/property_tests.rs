//! Property-based tests for stream and session invariants

mod property_tests {
    pub mod cache_invariants;
    pub mod generators;
    pub mod stream_invariants;
}
