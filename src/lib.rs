//! # tgi-chat
//!
//! Chat-completion client adapter for TGI (text-generation inference)
//! endpoints speaking the OpenAI-compatible `/v1/chat/completions` contract.
//!
//! ## Overview
//!
//! This crate translates a provider-agnostic chat model — an ordered list of
//! role-tagged messages plus a set of generation options — into the wire
//! format of a TGI HTTP endpoint, and the server's replies back into a
//! generic response shape. Two interaction modes are supported:
//!
//! - **One-shot**: [`TgiChatClient::call`] posts a request and decodes a
//!   single JSON response.
//! - **Streaming**: [`TgiChatClient::stream`] posts a request and exposes
//!   the reply as an ordered, consumed-once stream of partial-token chunks,
//!   one [`GenerationResponse`] per chunk.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tgi_chat::{Message, Prompt, TgiChatClient};
//!
//! #[tokio::main]
//! async fn main() -> tgi_chat::Result<()> {
//!     let client = TgiChatClient::builder()
//!         .base_url("http://localhost:11434")
//!         .build()?;
//!
//!     let prompt = Prompt::new(vec![Message::user("Hello, how are you?")]);
//!     let response = client.call(&prompt).await?;
//!     println!("{}", response.generations[0].text);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Wire request/response shapes for the remote endpoint |
//! | [`client`] | The chat client adapter and its builder |
//! | [`options`] | Generation options with merge/override semantics |
//! | [`transport`] | HTTP transport: one-shot decode and chunked streaming |
//! | [`types`] | Provider-agnostic prompt, message, and generation types |

pub mod api;
pub mod client;
pub mod options;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{TgiChatClient, TgiChatClientBuilder};
pub use options::TgiChatOptions;
pub use types::generation::{Generation, GenerationResponse, Usage};
pub use types::message::{Message, MessageType, ModelOptions, Prompt};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A pinned, boxed stream that emits `Result<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::Error;
