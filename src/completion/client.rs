use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::types::{CompletionRequest, CompletionResponse};
use crate::error::ChatError;

/// The remote side of a conversation.
///
/// Implementations perform exactly one call per invocation; retries are the
/// caller's business.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<CompletionResponse, ChatError>;
}

/// Client for OpenAI-compatible `/v1/chat/completions` endpoints.
pub struct HttpCompletionClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpCompletionClient {
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Transport(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn url(&self) -> String {
        format!("{}/v1/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionClient {
    async fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<CompletionResponse, ChatError> {
        let url = self.url();
        let mut http_request = self.client.post(&url).json(request);

        if let Some(api_key) = &self.api_key {
            http_request = http_request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| ChatError::Transport(format!("failed to reach {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Transport(format!(
                "API request failed with status {status}: {body}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Transport(format!("failed to read response body: {e}")))?;

        serde_json::from_str(&body)
            .map_err(|e| ChatError::MalformedResponse(format!("response is not valid JSON: {e}")))
    }
}
