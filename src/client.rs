//! The completion client: one blocking and one streaming operation against
//! a single OpenAI-compatible chat-completion endpoint.

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::stream::CompletionStream;
use crate::wire::{ChatRequest, ChatResponse};

/// Client for an OpenAI-compatible chat-completion endpoint.
///
/// Holds an immutable [`ClientConfig`] and a shared `reqwest` client.
/// Every operation performs exactly one outbound request; retry policy is
/// the caller's responsibility.
#[derive(Debug)]
pub struct CompletionClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl CompletionClient {
    /// Create a client from the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("ragline/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Issue a blocking completion request and return the full answer.
    ///
    /// # Errors
    ///
    /// [`ClientError::Transport`] for connection-level failures,
    /// [`ClientError::Api`] for non-success statuses (body preserved), and
    /// [`ClientError::MalformedResponse`] when a 2xx body is missing
    /// `choices[0].message.content`.
    pub async fn call(&self, prompt: &str) -> Result<String, ClientError> {
        debug!(
            endpoint = self.config.endpoint(),
            model = self.config.model(),
            "sending completion request"
        );

        let request = ChatRequest::from_prompt(self.config.model(), prompt, false);
        let response = self.send(&request).await?;
        let response = check_status(response).await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClientError::MalformedResponse {
                message: format!("response body is not valid JSON: {e}"),
            })?;

        body.into_content().ok_or_else(|| ClientError::MalformedResponse {
            message: "response has no choices[0].message.content".to_string(),
        })
    }

    /// Issue a streaming completion request.
    ///
    /// Returns a [`CompletionStream`] of text deltas once the response
    /// headers have been received. Status and connection errors on the
    /// initial exchange are returned here; read failures after that are
    /// surfaced through the stream itself.
    pub async fn stream(&self, prompt: &str) -> Result<CompletionStream, ClientError> {
        debug!(
            endpoint = self.config.endpoint(),
            model = self.config.model(),
            "sending streaming completion request"
        );

        let request = ChatRequest::from_prompt(self.config.model(), prompt, true);
        let response = self.send(&request).await?;
        let response = check_status(response).await?;

        Ok(CompletionStream::new(response))
    }

    async fn send(&self, request: &ChatRequest) -> Result<reqwest::Response, ClientError> {
        let mut req = self
            .http
            .post(self.config.endpoint())
            .header("Content-Type", "application/json")
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key()),
            );
        if request.stream {
            req = req.header("Accept", "text/event-stream");
        }

        req.json(request)
            .send()
            .await
            .map_err(|source| ClientError::Transport { source })
    }
}

/// Map a non-success status to [`ClientError::Api`], keeping whatever body
/// text is readable for diagnostics.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Api {
        status: status.as_u16(),
        body,
    })
}
