//! Client configuration and the credential-free identity descriptor.

use std::time::Duration;

use serde::Serialize;
use tracing::warn;

/// Configuration for a [`CompletionClient`](crate::CompletionClient).
///
/// Immutable after construction. The credential is allowed to be empty;
/// construction only logs a warning, and requests will fail against any
/// backend that enforces authentication.
#[derive(Clone)]
pub struct ClientConfig {
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a configuration for the given chat-completion endpoint.
    ///
    /// `endpoint` is the full URL of the completions route, e.g.
    /// `https://api.example.com/v1/chat/completions`.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let api_key = api_key.into();
        if api_key.is_empty() {
            warn!("API key is empty; requests will fail against authenticated backends");
        }
        Self {
            endpoint: endpoint.into(),
            api_key,
            model: model.into(),
            timeout: None,
        }
    }

    /// Set a request timeout on the underlying HTTP transport.
    ///
    /// The client itself has no timers; this is the only timeout applied.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The credential-free descriptor for this configuration.
    pub fn identity(&self) -> Identity {
        Identity {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Stable descriptor of a client's target, safe to log or use as a cache
/// key. Never contains the credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub endpoint: String,
    pub model: String,
}
