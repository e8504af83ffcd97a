//! Pull-based stream of text deltas from a streaming completion response.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures::Stream;
use tracing::debug;

use crate::error::ClientError;
use crate::wire::{StreamLine, parse_stream_line};

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// A finite, non-restartable sequence of text deltas.
///
/// Each item is one fragment of generated text, yielded in arrival order.
/// The stream ends cleanly on the `[DONE]` sentinel (or when the server
/// closes the connection); a transport failure mid-stream is surfaced as
/// an `Err` item at the next poll, after which the stream is over.
///
/// Dropping the stream drops the underlying response body, which releases
/// the connection; no explicit cancel call is needed.
pub struct CompletionStream {
    bytes: ByteStream,
    buffer: BytesMut,
    collected: String,
    done: bool,
}

impl std::fmt::Debug for CompletionStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionStream")
            .field("collected", &self.collected)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl CompletionStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self::from_bytes(Box::pin(response.bytes_stream()))
    }

    fn from_bytes(bytes: ByteStream) -> Self {
        Self {
            bytes,
            buffer: BytesMut::new(),
            collected: String::new(),
            done: false,
        }
    }

    /// The concatenation of every delta yielded so far.
    ///
    /// After the stream has been fully consumed this is the complete
    /// response text, matching what a blocking call would have returned.
    pub fn text(&self) -> &str {
        &self.collected
    }

    /// Pull the next complete line out of the reassembly buffer.
    ///
    /// The buffer holds raw bytes and only complete lines are converted
    /// to text: transport chunk boundaries are arbitrary, and a multi-byte
    /// code point split across two chunks must stay intact in the buffer
    /// until its line is whole.
    fn next_buffered_line(&mut self) -> Option<String> {
        let pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let line = self.buffer.split_to(pos + 1);
        Some(String::from_utf8_lossy(&line[..pos]).into_owned())
    }
}

impl Stream for CompletionStream {
    type Item = Result<String, ClientError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.done {
                return Poll::Ready(None);
            }

            while let Some(line) = this.next_buffered_line() {
                match parse_stream_line(&line) {
                    StreamLine::Delta(content) => {
                        this.collected.push_str(&content);
                        return Poll::Ready(Some(Ok(content)));
                    }
                    StreamLine::Done => {
                        this.done = true;
                        return Poll::Ready(None);
                    }
                    StreamLine::Skip => continue,
                }
            }

            match futures::ready!(this.bytes.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => {
                    this.buffer.extend_from_slice(&chunk);
                }
                Some(Err(source)) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(ClientError::Transport { source })));
                }
                None => {
                    // Connection closed without a sentinel; classify any
                    // partial line left in the buffer before finishing.
                    this.done = true;
                    if !this.buffer.is_empty() {
                        let rest = this.buffer.split_to(this.buffer.len());
                        let line = String::from_utf8_lossy(&rest).into_owned();
                        if let StreamLine::Delta(content) = parse_stream_line(&line) {
                            this.collected.push_str(&content);
                            return Poll::Ready(Some(Ok(content)));
                        }
                    }
                    debug!("stream ended without [DONE] sentinel");
                    return Poll::Ready(None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn stream_of(chunks: Vec<&'static [u8]>) -> CompletionStream {
        CompletionStream::from_bytes(Box::pin(futures::stream::iter(
            chunks
                .into_iter()
                .map(|chunk| Ok::<_, reqwest::Error>(Bytes::from_static(chunk))),
        )))
    }

    async fn collect(stream: &mut CompletionStream) -> Vec<String> {
        let mut deltas = Vec::new();
        while let Some(delta) = stream.next().await {
            deltas.push(delta.expect("delta"));
        }
        deltas
    }

    #[tokio::test]
    async fn multibyte_code_point_split_across_chunks() {
        // "é" is 0xC3 0xA9; the transport splits between the two bytes.
        let mut stream = stream_of(vec![
            b"data: {\"choices\":[{\"delta\":{\"content\":\"\xC3",
            b"\xA9\"}}]}\n\ndata: [DONE]\n\n",
        ]);

        assert_eq!(collect(&mut stream).await, vec!["\u{e9}".to_string()]);
        assert_eq!(stream.text(), "\u{e9}");
    }

    #[tokio::test]
    async fn line_split_across_chunks_reassembled() {
        let mut stream = stream_of(vec![
            b"data: {\"choices\":[{\"del",
            b"ta\":{\"content\":\"Hel\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n",
            b"\ndata: [DONE]\n\n",
        ]);

        assert_eq!(
            collect(&mut stream).await,
            vec!["Hel".to_string(), "lo".to_string()]
        );
        assert_eq!(stream.text(), "Hello");
    }

    #[tokio::test]
    async fn trailing_line_without_newline_still_classified() {
        let mut stream = stream_of(vec![b"data: {\"choices\":[{\"delta\":{\"content\":\"end\"}}]}"]);

        assert_eq!(collect(&mut stream).await, vec!["end".to_string()]);
        assert_eq!(stream.text(), "end");
    }
}
