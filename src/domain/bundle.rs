//! The bounded snapshot of repository metadata every analysis pass reads

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Size bounds applied while a bundle is assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleLimits {
    pub max_readme_chars: usize,
    pub max_file_chars: usize,
    /// Entries of the recursive listing that are considered at all
    pub max_tree_entries: usize,
    /// Entries of the listing kept in the bundle
    pub max_listed_files: usize,
    pub max_priority_files: usize,
}

impl Default for BundleLimits {
    fn default() -> Self {
        Self {
            max_readme_chars: 15_000,
            max_file_chars: 8_000,
            max_tree_entries: 2_000,
            max_listed_files: 500,
            max_priority_files: 12,
        }
    }
}

/// A priority configuration file and its possibly truncated text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub path: String,
    pub content: String,
}

impl ConfigFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Immutable per-request snapshot of a repository
///
/// Every field may be empty: the fetcher degrades each failed read to an
/// empty value instead of failing the whole bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBundle {
    pub repo_name: String,
    pub owner: String,
    pub description: String,
    pub readme: String,
    pub file_tree: Vec<String>,
    /// Priority configuration files in priority-list order
    pub config_files: Vec<ConfigFile>,
    /// Language name to byte-count weight
    pub languages: BTreeMap<String, u64>,
}

impl ContentBundle {
    /// A bundle carrying only the repository identity
    pub fn empty(owner: impl Into<String>, repo_name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo_name: repo_name.into(),
            ..Self::default()
        }
    }

    pub fn config_file(&self, path: &str) -> Option<&str> {
        self.config_files
            .iter()
            .find(|file| file.path == path)
            .map(|file| file.content.as_str())
    }

    /// Languages ordered by weight, heaviest first; ties keep name order
    pub fn languages_by_weight(&self) -> Vec<(&str, u64)> {
        let mut languages: Vec<(&str, u64)> = self
            .languages
            .iter()
            .map(|(name, weight)| (name.as_str(), *weight))
            .collect();
        languages.sort_by(|a, b| b.1.cmp(&a.1));
        languages
    }
}

/// Truncate to at most `max_chars` characters, respecting char boundaries
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
