//! Repository identity: the parsed `owner/repo` behind an analysis request and
//! the normalized key its cached results are stored under.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::domain::types::{RepoName, RepoOwner};
use crate::domain::validation_constants::repository::{GIT_SUFFIX, KEY_PATTERN, URL_PATTERN};

static REPOSITORY_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(URL_PATTERN).expect("repository URL pattern compiles"));

static REPOSITORY_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(KEY_PATTERN).expect("repository key pattern compiles"));

/// Why a repository URL was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryUrlError {
    #[error("url is required")]
    Missing,

    #[error("Invalid GitHub repository URL: {0}")]
    NotARepositoryUrl(String),
}

/// A GitHub repository named by a validated `https://github.com/<owner>/<repo>` URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: RepoOwner,
    pub name: RepoName,
}

impl RepositoryRef {
    /// Parse a repository URL. A trailing slash is tolerated, and a `.git`
    /// suffix on the repository segment is dropped.
    pub fn parse(url: &str) -> Result<Self, RepositoryUrlError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(RepositoryUrlError::Missing);
        }

        let invalid = || RepositoryUrlError::NotARepositoryUrl(url.to_string());
        let captures = REPOSITORY_URL.captures(url).ok_or_else(invalid)?;

        let owner = captures.get(1).map(|m| m.as_str()).ok_or_else(invalid)?;
        let name = captures.get(2).map(|m| m.as_str()).ok_or_else(invalid)?;
        let name = name.strip_suffix(GIT_SUFFIX).unwrap_or(name);

        Ok(Self {
            owner: RepoOwner::try_new(owner.to_string()).map_err(|_| invalid())?,
            name: RepoName::try_new(name.to_string()).map_err(|_| invalid())?,
        })
    }

    /// Cache key for this repository
    pub fn key(&self) -> RepoKey {
        RepoKey::from_segments(self.owner.as_ref(), self.name.as_ref())
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Normalized `owner/repo` key for the local result cache
///
/// Lower-cased, with any trailing slash and `.git` suffix removed, so that
/// `https://github.com/Foo/Bar.git/` and `https://github.com/foo/bar` collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoKey(String);

impl RepoKey {
    /// Derive a key from anything that mentions `github.com/<owner>/<repo>`,
    /// or from a bare `owner/repo` pair.
    pub fn from_url(input: &str) -> Option<Self> {
        let input = input.trim();
        let path = match REPOSITORY_KEY.captures(input) {
            Some(captures) => captures.get(1)?.as_str(),
            None if !input.contains("://") && input.matches('/').count() <= 2 => input,
            None => return None,
        };

        let path = path.trim_end_matches('/');
        let (owner, name) = path.split_once('/')?;
        Self::try_from_segments(owner, name)
    }

    fn from_segments(owner: &str, name: &str) -> Self {
        Self(format!(
            "{}/{}",
            owner.to_lowercase(),
            normalize_name(name).to_lowercase()
        ))
    }

    fn try_from_segments(owner: &str, name: &str) -> Option<Self> {
        let name = normalize_name(name);
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self::from_segments(owner, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn normalize_name(name: &str) -> &str {
    let name = name.trim_end_matches('/');
    name.strip_suffix(GIT_SUFFIX).unwrap_or(name)
}

impl fmt::Display for RepoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RepoKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://github.com/tokio-rs/axum", "tokio-rs", "axum")]
    #[case("https://github.com/tokio-rs/axum/", "tokio-rs", "axum")]
    #[case("http://github.com/serde-rs/serde.git", "serde-rs", "serde")]
    #[case("  https://github.com/a.b/c_d  ", "a.b", "c_d")]
    fn parses_repository_urls(#[case] url: &str, #[case] owner: &str, #[case] name: &str) {
        let repo = RepositoryRef::parse(url).unwrap();
        assert_eq!(repo.owner.as_ref(), owner);
        assert_eq!(repo.name.as_ref(), name);
    }

    #[rstest]
    #[case("https://gitlab.com/foo/bar")]
    #[case("https://github.com/foo")]
    #[case("https://github.com/foo/bar/tree/main")]
    #[case("github.com/foo/bar")]
    #[case("not a url")]
    fn rejects_non_repository_urls(#[case] url: &str) {
        assert!(matches!(
            RepositoryRef::parse(url),
            Err(RepositoryUrlError::NotARepositoryUrl(_))
        ));
    }

    #[test]
    fn empty_url_is_missing() {
        assert_eq!(RepositoryRef::parse("   "), Err(RepositoryUrlError::Missing));
    }

    #[test]
    fn equivalent_urls_share_a_cache_key() {
        let a = RepoKey::from_url("https://github.com/Foo/Bar.git/").unwrap();
        let b = RepoKey::from_url("https://github.com/foo/bar").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "foo/bar");
    }

    #[rstest]
    #[case("https://github.com/Tokio-RS/Axum/tree/main/examples", "tokio-rs/axum")]
    #[case("Foo/Bar", "foo/bar")]
    #[case("foo/bar.git/", "foo/bar")]
    fn normalizes_keys(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(RepoKey::from_url(input).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("https://example.com/foo/bar")]
    #[case("just-a-name")]
    fn rejects_inputs_without_a_repository(#[case] input: &str) {
        assert!(RepoKey::from_url(input).is_none());
    }

    #[test]
    fn repository_key_matches_url_key() {
        let repo = RepositoryRef::parse("https://github.com/Foo/Bar").unwrap();
        assert_eq!(
            repo.key(),
            RepoKey::from_url("https://github.com/foo/bar").unwrap()
        );
        assert_eq!(repo.to_string(), "Foo/Bar");
        assert_eq!(repo.url(), "https://github.com/Foo/Bar");
    }
}
