//! GitHub Metadata Fetcher
//!
//! Assembles a [`ContentBundle`] from the GitHub REST API and the raw content
//! host. The four top-level reads run concurrently, then the priority
//! configuration files found at the root of the listing are read
//! concurrently. Any single read that fails, times out, returns a non-200
//! status, or returns unexpected JSON degrades to empty content.

use async_trait::async_trait;
use base64::Engine;
use futures_util::future::join_all;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use super::constants::github::{
    json_fields, ACCEPT, PRIORITY_FILES, README_PATH, TOKEN_SCHEME, TREE_PATH, USER_AGENT,
};
use super::{ProviderError, RepositorySource};
use crate::config::GithubSettings;
use crate::domain::bundle::{truncate_chars, BundleLimits, ConfigFile, ContentBundle};
use crate::domain::repository::RepositoryRef;
use crate::infrastructure::log_messages::fetcher;

pub struct GithubFetcher {
    client: reqwest::Client,
    api_base_url: String,
    raw_base_url: String,
    token: Option<String>,
    limits: BundleLimits,
}

impl GithubFetcher {
    pub fn new(settings: &GithubSettings) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            client,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            raw_base_url: settings.raw_base_url.trim_end_matches('/').to_string(),
            token: settings.token.clone().filter(|t| !t.trim().is_empty()),
            limits: settings.bundle_limits(),
        })
    }

    fn repo_api_url(&self, repo: &RepositoryRef) -> String {
        format!("{}/repos/{}/{}", self.api_base_url, repo.owner, repo.name)
    }

    async fn get(&self, url: &str) -> Option<reqwest::Response> {
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, ACCEPT);
        if let Some(token) = &self.token {
            request = request.header(
                reqwest::header::AUTHORIZATION,
                format!("{TOKEN_SCHEME} {token}"),
            );
        }

        match request.send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => Some(response),
            Ok(response) => {
                debug!(url, status = response.status().as_u16(), "{}", fetcher::READ_DEGRADED);
                None
            }
            Err(e) => {
                debug!(url, error = %e, "{}", fetcher::READ_DEGRADED);
                None
            }
        }
    }

    async fn get_json(&self, url: &str) -> Option<Value> {
        let response = self.get(url).await?;
        match response.json::<Value>().await {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(url, error = %e, "{}", fetcher::READ_DEGRADED);
                None
            }
        }
    }

    async fn get_text(&self, url: &str) -> String {
        match self.get(url).await {
            Some(response) => response.text().await.unwrap_or_default(),
            None => String::new(),
        }
    }

    async fn description(&self, repo: &RepositoryRef) -> String {
        self.get_json(&self.repo_api_url(repo))
            .await
            .and_then(|info| {
                info.get(json_fields::DESCRIPTION)
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_default()
    }

    async fn readme(&self, repo: &RepositoryRef) -> String {
        let url = format!(
            "{}/{}/{}/{}",
            self.raw_base_url, repo.owner, repo.name, README_PATH
        );
        let text = self.get_text(&url).await;
        truncate_chars(&text, self.limits.max_readme_chars).to_string()
    }

    async fn tree(&self, repo: &RepositoryRef) -> Vec<String> {
        let url = format!("{}/{}", self.repo_api_url(repo), TREE_PATH);
        let Some(listing) = self.get_json(&url).await else {
            return Vec::new();
        };

        listing
            .get(json_fields::TREE)
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .take(self.limits.max_tree_entries)
                    .filter_map(|entry| entry.get(json_fields::PATH).and_then(Value::as_str))
                    .filter(|path| !path.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn languages(&self, repo: &RepositoryRef) -> BTreeMap<String, u64> {
        let url = format!("{}/languages", self.repo_api_url(repo));
        self.get_json(&url)
            .await
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    async fn file_content(&self, repo: &RepositoryRef, path: &str) -> String {
        let url = format!("{}/contents/{}", self.repo_api_url(repo), path);
        let Some(encoded) = self
            .get_json(&url)
            .await
            .and_then(|file| {
                file.get(json_fields::CONTENT)
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
        else {
            return String::new();
        };

        match decode_content(&encoded) {
            Some(text) => truncate_chars(&text, self.limits.max_file_chars).to_string(),
            None => {
                debug!(path, "{}", fetcher::READ_DEGRADED);
                String::new()
            }
        }
    }
}

#[async_trait]
impl RepositorySource for GithubFetcher {
    async fn fetch_bundle(&self, repo: &RepositoryRef) -> Result<ContentBundle, ProviderError> {
        let (description, readme, tree, languages) = tokio::join!(
            self.description(repo),
            self.readme(repo),
            self.tree(repo),
            self.languages(repo),
        );

        let wanted = select_priority_files(&tree, self.limits.max_priority_files);
        let contents = join_all(wanted.iter().map(|path| self.file_content(repo, path))).await;

        let config_files: Vec<ConfigFile> = wanted
            .into_iter()
            .zip(contents)
            .filter(|(_, content)| !content.is_empty())
            .map(|(path, content)| ConfigFile::new(path, content))
            .collect();

        let mut file_tree = tree;
        file_tree.truncate(self.limits.max_listed_files);

        let bundle = ContentBundle {
            repo_name: repo.name.to_string(),
            owner: repo.owner.to_string(),
            description,
            readme,
            file_tree,
            config_files,
            languages,
        };

        info!(
            repo = %repo,
            files = bundle.file_tree.len(),
            config_files = bundle.config_files.len(),
            languages = bundle.languages.len(),
            "{}",
            fetcher::BUNDLE_ASSEMBLED
        );

        Ok(bundle)
    }
}

/// Priority files present in the listing, in priority order, capped
fn select_priority_files(tree: &[String], cap: usize) -> Vec<&'static str> {
    let present: HashSet<&str> = tree.iter().map(String::as_str).collect();
    PRIORITY_FILES
        .iter()
        .copied()
        .filter(|name| present.contains(name))
        .take(cap)
        .collect()
}

/// Decode GitHub's line-wrapped base64, replacing invalid UTF-8
fn decode_content(encoded: &str) -> Option<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}
