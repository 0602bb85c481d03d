//! HTTP transport for the chat endpoint.
//!
//! Two dispatch modes over one shared `reqwest::Client`: one-shot
//! POST-and-decode, and POST-and-consume a record-delimited JSON chunk
//! stream. Non-2xx responses are classified uniformly in both modes before
//! any body decoding happens.

use bytes::{Bytes, BytesMut};
use futures::{stream, StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use std::env;
use std::time::Duration;
use tracing::{trace, warn};

use crate::api::{ChatRequest, ChatResponse, ChatStreamChunk};
use crate::{BoxStream, Error, Result};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Immutable per-client transport: base URL plus a shared connection pool.
/// Safe to use from any number of concurrent tasks; all per-call state
/// lives in the request and response values.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl HttpTransport {
    /// Build a transport against `base_url` with JSON default headers.
    ///
    /// The one-shot request timeout defaults to 30s and can be overridden
    /// with `TGI_HTTP_TIMEOUT_SECS`. Streaming responses are not subject to
    /// it — a stream lives until the server closes it or the consumer drops
    /// it.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let timeout_secs = env::var("TGI_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One-shot dispatch: POST `request` to `path` and decode the full body
    /// as a [`ChatResponse`].
    pub async fn post_and_decode(&self, path: &str, request: &ChatRequest) -> Result<ChatResponse> {
        if request.stream {
            return Err(Error::configuration(
                "stream must be disabled for one-shot dispatch",
            ));
        }

        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .timeout(self.request_timeout)
            .json(request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(Error::Protocol)
    }

    /// Streaming dispatch: POST `request` to `path` and expose the body as
    /// an ordered, consumed-once stream of decoded chunks.
    ///
    /// Each record is decoded independently as it arrives; a record that
    /// fails to decode surfaces as an `Err` element without ending the
    /// stream. Dropping the stream drops the underlying response and
    /// releases the connection.
    pub async fn post_and_stream(
        &self,
        path: &str,
        request: &ChatRequest,
    ) -> Result<BoxStream<'static, ChatStreamChunk>> {
        if !request.stream {
            return Err(Error::configuration(
                "stream must be enabled for streaming dispatch",
            ));
        }

        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let bytes = Box::pin(response.bytes_stream().map_err(Error::Transport));
        Ok(decode_chunk_stream(bytes))
    }

    /// Uniform non-2xx policy: read the full body as text, log it, and fail
    /// with a [`Error::Remote`] carrying status, status text, and body.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let status_text = status.canonical_reason().unwrap_or("").to_string();
        let body = response.text().await.unwrap_or_default();
        warn!(
            status = status.as_u16(),
            status_text = %status_text,
            body = %body,
            "chat endpoint returned an error"
        );
        Err(Error::Remote {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}

enum Record {
    Chunk(Result<ChatStreamChunk>),
    Skip,
    Done,
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// Decode one record-delimited line. Tolerates SSE-style `data:` prefixes
/// and comment lines, and treats `[DONE]` as end-of-stream, so both plain
/// JSONL and OpenAI-compatible SSE framings decode with the same buffer.
fn parse_record(line: &[u8]) -> Record {
    let trimmed = trim_ascii(line);
    if trimmed.is_empty() || trimmed[0] == b':' {
        return Record::Skip;
    }

    let payload = match trimmed.strip_prefix(&b"data:"[..]) {
        Some(rest) => trim_ascii(rest),
        None => trimmed,
    };
    if payload == &b"[DONE]"[..] {
        return Record::Done;
    }

    trace!(record = %String::from_utf8_lossy(payload), "chat stream record");
    Record::Chunk(serde_json::from_slice(payload).map_err(Error::Protocol))
}

/// Incrementally buffer bytes and emit one decoded chunk per complete
/// record. Pull-based: no network read happens until the consumer polls.
///
/// The buffer stays raw bytes until a full record is framed — a multi-byte
/// UTF-8 sequence may arrive split across network chunks, so text decoding
/// must not happen at chunk boundaries.
fn decode_chunk_stream(input: BoxStream<'static, Bytes>) -> BoxStream<'static, ChatStreamChunk> {
    let stream = stream::unfold((input, BytesMut::new()), |(mut input, mut buf)| async move {
        loop {
            // Emit the next complete record already in the buffer, if any.
            if let Some(idx) = buf.iter().position(|&b| b == b'\n') {
                let line = buf.split_to(idx + 1);
                match parse_record(&line[..idx]) {
                    Record::Chunk(result) => return Some((result, (input, buf))),
                    Record::Skip => continue,
                    Record::Done => return None,
                }
            }

            // Need more data.
            match input.next().await {
                Some(Ok(bytes)) => buf.extend_from_slice(&bytes),
                Some(Err(e)) => return Some((Err(e), (input, buf))),
                None => {
                    // EOF: flush whatever remains in the buffer once.
                    let line = buf.split_to(buf.len());
                    return match parse_record(&line) {
                        Record::Chunk(result) => Some((result, (input, buf))),
                        Record::Skip | Record::Done => None,
                    };
                }
            }
        }
    });

    Box::pin(stream)
}
