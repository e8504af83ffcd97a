//! # ragline
//!
//! Client for OpenAI-compatible chat-completion endpoints with blocking
//! and streaming response modes, plus an adapter that presents the client
//! to a text-generation evaluation harness as a single-call capability.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use ragline::{ClientConfig, CompletionClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new(
//!         "https://api.example.com/v1/chat/completions",
//!         std::env::var("API_KEY").unwrap_or_default(),
//!         "deepseek-v3",
//!     );
//!     let client = CompletionClient::new(config)?;
//!
//!     // Blocking: one request, one answer.
//!     let answer = client.call("Hello, how are you today?").await?;
//!     println!("{answer}");
//!
//!     // Streaming: fragments as they arrive.
//!     let mut stream = client.stream("Tell me a story.").await?;
//!     while let Some(delta) = stream.next().await {
//!         print!("{}", delta?);
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod harness;
mod stream;
mod wire;

pub use client::CompletionClient;
pub use config::{ClientConfig, Identity};
pub use error::ClientError;
pub use harness::{HarnessAdapter, TextGenerator};
pub use stream::CompletionStream;
