//! Adapter exposing the completion client to an evaluation harness.
//!
//! Harnesses call one method per prompt and expect one string back; the
//! adapter translates that contract onto [`CompletionClient::call`] and
//! exposes a credential-free [`Identity`] for caching and provenance.

use async_trait::async_trait;
use tracing::error;

use crate::client::CompletionClient;
use crate::config::{ClientConfig, Identity};
use crate::error::ClientError;

/// Single-call text-generation capability consumed by a harness.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate one complete answer for one prompt.
    async fn run(&self, prompt: &str) -> Result<String, ClientError>;

    /// Descriptor of the backing endpoint and model. Must never include
    /// the credential.
    fn identity(&self) -> Identity;
}

/// Adapter owning one [`CompletionClient`] for its lifetime.
///
/// Holds no per-call state and is safe to reuse across any number of
/// sequential `run` calls.
#[derive(Debug)]
pub struct HarnessAdapter {
    client: CompletionClient,
}

impl HarnessAdapter {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            client: CompletionClient::new(config)?,
        })
    }

    /// Wrap an already-constructed client.
    pub fn from_client(client: CompletionClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &CompletionClient {
        &self.client
    }
}

#[async_trait]
impl TextGenerator for HarnessAdapter {
    /// Delegates to the client's blocking call. Failures are logged and
    /// re-raised unchanged so the harness keeps the original error for its
    /// own retry and reporting logic.
    async fn run(&self, prompt: &str) -> Result<String, ClientError> {
        self.client.call(prompt).await.inspect_err(|e| {
            error!(error = %e, "completion request failed");
        })
    }

    fn identity(&self) -> Identity {
        self.client.config().identity()
    }
}
