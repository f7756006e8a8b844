//! Local result cache invariants

use proptest::prelude::*;
use tempfile::TempDir;

use super::generators::analysis_results;
use glassbox::client::{FileResultCache, MemoryResultCache, ResultCache};

/// Spellings of the same repository that must share one entry
fn url_variant(owner: &str, repo: &str, variant: u8) -> String {
    match variant % 5 {
        0 => format!("https://github.com/{owner}/{repo}"),
        1 => format!("https://github.com/{owner}/{repo}/"),
        2 => format!("https://github.com/{owner}/{repo}.git"),
        3 => format!("https://github.com/{}/{}", owner.to_uppercase(), repo.to_uppercase()),
        _ => format!("https://github.com/{owner}/{repo}.git/"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn file_cache_round_trips_across_url_spellings(
        results in analysis_results(),
        owner in "[a-z][a-z0-9-]{0,12}",
        repo in "[a-z][a-z0-9_.-]{0,12}",
        write_as in any::<u8>(),
        read_as in any::<u8>(),
    ) {
        prop_assume!(!repo.ends_with(".git") && !repo.ends_with('.'));
        let dir = TempDir::new().unwrap();
        let cache = FileResultCache::new(dir.path());

        cache.put_for_url(&url_variant(&owner, &repo, write_as), &results);
        prop_assert_eq!(
            cache.get_for_url(&url_variant(&owner, &repo, read_as)),
            Some(results)
        );
    }

    #[test]
    fn later_writes_replace_earlier_ones(
        first in analysis_results(),
        second in analysis_results(),
    ) {
        let cache = MemoryResultCache::new();
        cache.put_for_url("https://github.com/octo/demo", &first);
        cache.put_for_url("https://github.com/octo/demo", &second);

        prop_assert_eq!(cache.get_for_url("https://github.com/octo/demo"), Some(second));
        prop_assert_eq!(cache.len(), 1);
    }
}
