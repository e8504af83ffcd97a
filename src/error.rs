use thiserror::Error;

/// Errors surfaced by the completion client and the harness adapter.
///
/// Malformed streaming frames are not represented here: they are skipped
/// inside the stream loop and never escalate to the caller.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection, DNS resolution, timeout, or mid-stream read failure.
    #[error("transport failure: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status. The response body is
    /// preserved verbatim for diagnostics.
    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// A 2xx response body that does not carry the expected content path
    /// (`choices[0].message.content`).
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },

    /// The underlying HTTP client could not be constructed.
    #[error("client configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Status code for `Api` errors, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
