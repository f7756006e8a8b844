//! Prompt Builder
//!
//! Turns a [`ContentBundle`] and a pass definition (or a discovery request)
//! into the single user message sent to the completion provider.
//!
//! Substitution is single-pass: the template is scanned once for `{name}`
//! tokens made of lowercase letters and underscores. Text inserted for one
//! placeholder is never re-scanned, so a README that happens to contain
//! `{readme}` stays literal. Tokens that are not known placeholders, such as
//! the JSON braces in the response-shape section of every template, are left
//! untouched.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::domain::bundle::ContentBundle;
use crate::domain::discovery::DiscoveryRequest;
use crate::domain::passes::PassDefinition;
use crate::domain::validation_constants::prompt::{MAX_LANGUAGES, MAX_TREE_LINES};

/// Template used for discovery mode
pub const DISCOVERY_TEMPLATE: &str = include_str!("templates/discovery.txt");

const NO_PREFERENCE: &str = "Any";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    #[error("Template for {0} is empty")]
    MissingTemplate(String),
}

/// `{name}` tokens in a template
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern compiles"));

/// Replace every known `{name}` token in one scan over `template`
pub fn substitute(template: &str, values: &HashMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            match values.get(name) {
                Some(value) => value.clone(),
                None => caps
                    .get(0)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
            }
        })
        .into_owned()
}

/// Build the prompt for one analysis pass
pub fn build_pass_prompt(
    definition: &PassDefinition,
    bundle: &ContentBundle,
) -> Result<String, PromptError> {
    if definition.template.trim().is_empty() {
        return Err(PromptError::MissingTemplate(
            definition.name.as_str().to_string(),
        ));
    }

    let values = HashMap::from([
        ("repo_name", bundle.repo_name.clone()),
        ("description", bundle.description.clone()),
        ("readme", bundle.readme.clone()),
        ("file_tree", format_file_tree(&bundle.file_tree)),
        ("languages", format_languages(bundle)),
        ("config_files", format_config_files(bundle)),
    ]);

    Ok(substitute(definition.template, &values))
}

/// Build the prompt for a discovery request
pub fn build_discovery_prompt(request: &DiscoveryRequest) -> String {
    let filters = &request.filters;

    let languages = if filters.languages.is_empty() {
        NO_PREFERENCE.to_string()
    } else {
        filters.languages.join(", ")
    };

    let actively_maintained = match filters.actively_maintained {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "No preference",
    };

    let values = HashMap::from([
        ("query", request.query.as_ref().to_string()),
        ("languages", languages),
        ("domain", or_any(&filters.domain)),
        ("scale", or_any(&filters.scale)),
        ("license_preference", or_any(&filters.license_preference)),
        ("actively_maintained", actively_maintained.to_string()),
        ("max_results", request.max_results.to_string()),
    ]);

    substitute(DISCOVERY_TEMPLATE, &values)
}

fn or_any(value: &str) -> String {
    if value.trim().is_empty() {
        NO_PREFERENCE.to_string()
    } else {
        value.to_string()
    }
}

fn format_file_tree(paths: &[String]) -> String {
    paths
        .iter()
        .take(MAX_TREE_LINES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_languages(bundle: &ContentBundle) -> String {
    bundle
        .languages_by_weight()
        .into_iter()
        .take(MAX_LANGUAGES)
        .map(|(name, weight)| format!("{name}: {weight}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_config_files(bundle: &ContentBundle) -> String {
    bundle
        .config_files
        .iter()
        .map(|file| format!("\n--- {} ---\n{}\n", file.path, file.content))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bundle::ConfigFile;
    use crate::domain::discovery::DiscoveryFilters;
    use crate::domain::passes::{PassName, PASS_DEFINITIONS};
    use crate::domain::types::{DiscoveryQuery, MaxResults};

    fn sample_bundle() -> ContentBundle {
        let mut bundle = ContentBundle::empty("tokio-rs", "axum");
        bundle.description = "Ergonomic web framework".into();
        bundle.readme = "# axum".into();
        bundle.file_tree = vec!["Cargo.toml".into(), "src/lib.rs".into()];
        bundle.languages.insert("Rust".into(), 900);
        bundle.languages.insert("Shell".into(), 20);
        bundle.config_files.push(ConfigFile::new(
            "Cargo.toml",
            "[package]\nname = \"axum\"",
        ));
        bundle
    }

    #[test]
    fn empty_bundle_builds_every_pass_prompt() {
        let bundle = ContentBundle::empty("o", "r");
        for definition in &PASS_DEFINITIONS {
            let prompt = build_pass_prompt(definition, &bundle).unwrap();
            assert!(prompt.contains("Repository: r\n"));
            assert!(!prompt.contains("{readme}"));
            assert!(!prompt.contains("{config_files}"));
            assert!(!prompt.contains("{file_tree}"));
        }
    }

    #[test]
    fn bundle_fields_are_formatted() {
        let prompt =
            build_pass_prompt(PassName::SystemOverview.definition(), &sample_bundle()).unwrap();

        assert!(prompt.contains("Repository: axum\n"));
        assert!(!prompt.contains("tokio-rs"));
        assert!(prompt.contains("Ergonomic web framework"));
        assert!(prompt.contains("Cargo.toml\nsrc/lib.rs"));
        assert!(prompt.contains("Rust: 900, Shell: 20"));
        assert!(prompt.contains("\n--- Cargo.toml ---\n[package]\nname = \"axum\"\n"));
    }

    #[test]
    fn config_files_keep_bundle_order() {
        let mut bundle = sample_bundle();
        bundle.config_files.insert(0, ConfigFile::new("package.json", "{}"));
        bundle.config_files.push(ConfigFile::new("Makefile", "all:"));

        let prompt =
            build_pass_prompt(PassName::SafeRunPlan.definition(), &bundle).unwrap();
        let position = |name: &str| prompt.find(&format!("--- {name} ---")).unwrap();
        assert!(position("package.json") < position("Cargo.toml"));
        assert!(position("Cargo.toml") < position("Makefile"));
    }

    #[test]
    fn inserted_text_is_not_rescanned() {
        let mut bundle = sample_bundle();
        bundle.readme = "literal {description} and {repo_name}".into();

        let prompt = build_pass_prompt(PassName::SecurityRisk.definition(), &bundle).unwrap();
        assert!(prompt.contains("literal {description} and {repo_name}"));
    }

    #[test]
    fn unknown_tokens_are_left_alone() {
        let values = HashMap::from([("known", "x".to_string())]);
        assert_eq!(
            substitute("{known} {unknown} {\"json\": 1}", &values),
            "x {unknown} {\"json\": 1}"
        );
    }

    #[test]
    fn file_tree_is_capped() {
        let paths: Vec<String> = (0..250).map(|i| format!("file_{i}.rs")).collect();
        let tree = format_file_tree(&paths);
        assert_eq!(tree.lines().count(), MAX_TREE_LINES);
        assert!(!tree.contains("file_200.rs"));
    }

    #[test]
    fn languages_are_capped_at_ten() {
        let mut bundle = ContentBundle::empty("o", "r");
        for i in 0..15u64 {
            bundle.languages.insert(format!("Lang{i:02}"), 100 - i);
        }
        assert_eq!(format_languages(&bundle).split(", ").count(), MAX_LANGUAGES);
    }

    #[test]
    fn empty_template_is_rejected() {
        let definition = PassDefinition {
            name: PassName::SafeRunPlan,
            title: "Let's Run It",
            template: "  ",
        };
        assert_eq!(
            build_pass_prompt(&definition, &ContentBundle::default()),
            Err(PromptError::MissingTemplate("safe_run_plan".into()))
        );
    }

    #[test]
    fn discovery_prompt_defaults_filters_to_any() {
        let query = DiscoveryQuery::try_new("a terminal file manager".to_string()).unwrap();
        let prompt = build_discovery_prompt(&DiscoveryRequest::new(query));

        assert!(prompt.contains("a terminal file manager"));
        assert!(prompt.contains("Preferred Languages: Any"));
        assert!(prompt.contains("Domain/Category: Any"));
        assert!(prompt.contains("Actively Maintained Only: No preference"));
        assert!(prompt.contains("Number of recommendations requested: 5"));
    }

    #[test]
    fn discovery_prompt_uses_filters() {
        let query = DiscoveryQuery::try_new("an embedded database".to_string()).unwrap();
        let request = DiscoveryRequest::new(query)
            .with_filters(DiscoveryFilters {
                languages: vec!["Rust".into(), "Go".into()],
                domain: "storage".into(),
                scale: String::new(),
                license_preference: "MIT".into(),
                actively_maintained: Some(true),
            })
            .with_max_results(MaxResults::try_new(3).unwrap());

        let prompt = build_discovery_prompt(&request);
        assert!(prompt.contains("Preferred Languages: Rust, Go"));
        assert!(prompt.contains("Scale/Size: Any"));
        assert!(prompt.contains("License Preference: MIT"));
        assert!(prompt.contains("Actively Maintained Only: Yes"));
        assert!(prompt.contains("Number of recommendations requested: 3"));
    }
}
