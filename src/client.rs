//! Chat client adapter: generic prompts in, generic generations out.

use futures::StreamExt;
use tracing::debug;

use crate::api::{self, ChatRequest, ChatResponse, ChatStreamChunk};
use crate::options::TgiChatOptions;
use crate::transport::{HttpTransport, DEFAULT_BASE_URL};
use crate::types::generation::{Generation, GenerationResponse, Usage};
use crate::types::message::{MessageType, Prompt};
use crate::{BoxStream, Error, Result};

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Text substituted when a streamed chunk carries no choice at all, so one
/// malformed keep-alive frame cannot end an otherwise healthy stream.
const NO_CONTENT: &str = "No content";

/// Client adapter for a TGI chat-completions endpoint.
///
/// Converts a [`Prompt`] into the wire request, dispatches it through the
/// transport in the requested mode, and converts the wire response(s) back
/// into [`GenerationResponse`] values. The client holds only immutable
/// configuration and is safe to share across tasks; default options are
/// merged copy-on-write into each request, never mutated.
pub struct TgiChatClient {
    transport: HttpTransport,
    default_options: TgiChatOptions,
}

impl TgiChatClient {
    pub fn builder() -> TgiChatClientBuilder {
        TgiChatClientBuilder::new()
    }

    /// Build a client over a preconfigured transport, with default options.
    pub fn new(transport: HttpTransport) -> Self {
        Self {
            transport,
            default_options: TgiChatOptions::default(),
        }
    }

    /// One-shot completion: exactly one [`Generation`] carrying the wire
    /// response's message content. Usage is attached only when the server
    /// reported both prompt and generation token counts.
    pub async fn call(&self, prompt: &Prompt) -> Result<GenerationResponse> {
        let request = self.build_request(prompt, false)?;
        let response = self
            .transport
            .post_and_decode(CHAT_COMPLETIONS_PATH, &request)
            .await?;
        Ok(to_generation_response(response))
    }

    /// Streaming completion: one [`GenerationResponse`] per chunk, each
    /// carrying only that chunk's incremental text, in server-emission
    /// order.
    ///
    /// The stream is finite but of unknown length until close, and not
    /// restartable. Dropping it before the end releases the underlying
    /// connection.
    pub async fn stream(&self, prompt: &Prompt) -> Result<BoxStream<'static, GenerationResponse>> {
        let request = self.build_request(prompt, true)?;
        let chunks = self
            .transport
            .post_and_stream(CHAT_COMPLETIONS_PATH, &request)
            .await?;
        Ok(Box::pin(
            chunks.map(|chunk| chunk.map(chunk_to_generation_response)),
        ))
    }

    /// Shared request-building core for both modes: validate the options
    /// kind, merge with defaults, require a model, filter and map roles,
    /// and set the `stream` flag for the dispatch mode.
    fn build_request(&self, prompt: &Prompt, stream: bool) -> Result<ChatRequest> {
        let mut messages = Vec::with_capacity(prompt.messages.len());
        for message in prompt.messages.iter().filter(|m| is_supported(m.message_type)) {
            messages.push(api::ChatMessage {
                role: to_wire_role(message.message_type)?,
                content: message.content.clone(),
                images: message.images.clone(),
            });
        }

        let runtime = match prompt.options.as_deref() {
            Some(options) => Some(
                options
                    .as_any()
                    .downcast_ref::<TgiChatOptions>()
                    .ok_or(Error::InvalidOptionsType {
                        expected: "TgiChatOptions",
                    })?,
            ),
            None => None,
        };
        let merged = TgiChatOptions::merge(runtime, &self.default_options);

        let model = merged
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| Error::configuration("model is not set"))?;

        let request = ChatRequest::builder(model)
            .messages(messages)
            .stream(stream)
            .options(merged.to_wire_map())
            .build();

        debug!(
            request = %serde_json::to_string(&request).unwrap_or_default(),
            "built chat request"
        );

        Ok(request)
    }
}

fn is_supported(message_type: MessageType) -> bool {
    matches!(
        message_type,
        MessageType::System | MessageType::User | MessageType::Assistant
    )
}

/// Total over the supported kinds; the defensive arm covers any future
/// addition to [`MessageType`] that the filter does not yet know about.
fn to_wire_role(message_type: MessageType) -> Result<api::Role> {
    match message_type {
        MessageType::System => Ok(api::Role::System),
        MessageType::User => Ok(api::Role::User),
        MessageType::Assistant => Ok(api::Role::Assistant),
        other => Err(Error::unrecognized_role(format!(
            "unsupported message type: {other:?}"
        ))),
    }
}

fn to_generation_response(response: ChatResponse) -> GenerationResponse {
    let mut generation = Generation::new(response.message.content);
    if let (Some(prompt_tokens), Some(generation_tokens)) =
        (response.prompt_eval_count, response.eval_count)
    {
        generation = generation.with_usage(Usage {
            prompt_tokens,
            generation_tokens,
        });
    }
    GenerationResponse::new(vec![generation])
}

fn chunk_to_generation_response(chunk: ChatStreamChunk) -> GenerationResponse {
    let text = chunk
        .choices
        .as_ref()
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.delta.content.clone())
        .unwrap_or_else(|| NO_CONTENT.to_string());
    GenerationResponse::new(vec![Generation::new(text)])
}

/// Builder for [`TgiChatClient`].
pub struct TgiChatClientBuilder {
    base_url: Option<String>,
    default_options: Option<TgiChatOptions>,
}

impl TgiChatClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            default_options: None,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn default_options(mut self, options: TgiChatOptions) -> Self {
        self.default_options = Some(options);
        self
    }

    pub fn build(self) -> Result<TgiChatClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let transport = HttpTransport::new(base_url)?;
        Ok(TgiChatClient {
            transport,
            default_options: self.default_options.unwrap_or_default(),
        })
    }
}

impl Default for TgiChatClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
