//! Anthropic Messages API completion provider

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::constants::anthropic::{block_types, headers, API_VERSION, MESSAGES_PATH, USER_ROLE};
use super::constants::http::content_types::APPLICATION_JSON;
use super::{CompletionProvider, ProviderError};
use crate::config::AnthropicSettings;
use crate::domain::types::ApiKey;
use crate::infrastructure::log_messages::provider;

/// Completion provider backed by `POST {base_url}/v1/messages`
pub struct AnthropicProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: ApiKey,
    model: String,
    max_tokens: u32,
}

impl AnthropicProvider {
    pub fn new(settings: &AnthropicSettings, api_key: ApiKey) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", settings.base_url.trim_end_matches('/'), MESSAGES_PATH),
            api_key,
            model: settings.model_name.clone(),
            max_tokens: settings.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request_body(&self, prompt: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{ "role": USER_ROLE, "content": prompt }],
        })
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(headers::API_KEY, self.api_key.as_ref())
            .header(headers::VERSION, API_VERSION)
            .header(reqwest::header::CONTENT_TYPE, APPLICATION_JSON)
            .json(&self.build_request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let message: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        debug!(
            model = %self.model,
            blocks = message.content.len(),
            "{}",
            provider::COMPLETION_RECEIVED
        );

        message.first_text().ok_or(ProviderError::EmptyCompletion)
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    fn first_text(self) -> Option<String> {
        self.content
            .into_iter()
            .find(|block| block.kind == block_types::TEXT)
            .and_then(|block| block.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn settings_for(base_url: String) -> AnthropicSettings {
        AnthropicSettings {
            api_key: Some("sk-test".into()),
            model_name: "claude-test".into(),
            base_url,
            max_tokens: 4096,
            request_timeout_secs: 5,
        }
    }

    fn provider_for(base_url: String) -> AnthropicProvider {
        let key = ApiKey::try_new("sk-test".to_string()).unwrap();
        AnthropicProvider::new(&settings_for(base_url), key).unwrap()
    }

    #[tokio::test]
    async fn test_returns_first_text_block() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "sk-test")
            .match_header("anthropic-version", "2023-06-01")
            .match_body(Matcher::PartialJson(json!({
                "model": "claude-test",
                "max_tokens": 4096,
                "messages": [{"role": "user", "content": "describe the repo"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": "msg_1",
                    "type": "message",
                    "content": [
                        {"type": "thinking", "thinking": "hmm"},
                        {"type": "text", "text": "{\"purpose\": \"demo\"}"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let text = provider_for(server.url())
            .complete("describe the repo")
            .await
            .unwrap();

        assert_eq!(text, "{\"purpose\": \"demo\"}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(529)
            .with_body("overloaded")
            .create_async()
            .await;

        let err = provider_for(server.url()).complete("x").await.unwrap_err();
        assert_eq!(
            err,
            ProviderError::Status {
                status: 529,
                body: "overloaded".into()
            }
        );
    }

    #[tokio::test]
    async fn test_reply_without_text_is_empty_completion() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(json!({"content": []}).to_string())
            .create_async()
            .await;

        let err = provider_for(server.url()).complete("x").await.unwrap_err();
        assert_eq!(err, ProviderError::EmptyCompletion);
    }

    #[tokio::test]
    async fn test_garbage_body_is_invalid_response() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let err = provider_for(server.url()).complete("x").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let provider = provider_for("https://api.example.com/".into());
        assert_eq!(provider.endpoint, "https://api.example.com/v1/messages");
        assert_eq!(provider.model(), "claude-test");
    }
}
