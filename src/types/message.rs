//! Generic prompt-side message model.

use std::any::Any;
use std::fmt;

/// A role-tagged message in a conversation, as seen by callers of the
/// adapter. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message_type: MessageType,
    pub content: String,
    /// Base64-encoded images attached to the message, forwarded to the
    /// wire as-is.
    pub images: Option<Vec<String>>,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self::text(MessageType::System, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::text(MessageType::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(MessageType::Assistant, text)
    }

    pub fn tool(text: impl Into<String>) -> Self {
        Self::text(MessageType::Tool, text)
    }

    fn text(message_type: MessageType, content: impl Into<String>) -> Self {
        Self {
            message_type,
            content: content.into(),
            images: None,
        }
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = Some(images);
        self
    }
}

/// Generic message kind. Wider than the wire vocabulary: the adapter only
/// forwards `System`, `User` and `Assistant`; anything else is filtered out
/// of the request with order preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    System,
    User,
    Assistant,
    Tool,
}

/// Pluggable option sets attached to a [`Prompt`].
///
/// The adapter downcasts to its own option type at request-build time and
/// rejects anything else with [`crate::Error::InvalidOptionsType`], so
/// callers can carry options for other model families through the same
/// prompt shape.
pub trait ModelOptions: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

/// The caller-facing unit of work: an ordered set of role-tagged messages
/// plus optional generation options.
#[derive(Debug)]
pub struct Prompt {
    pub messages: Vec<Message>,
    pub options: Option<Box<dyn ModelOptions>>,
}

impl Prompt {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            options: None,
        }
    }

    pub fn with_options(messages: Vec<Message>, options: impl ModelOptions) -> Self {
        Self {
            messages,
            options: Some(Box::new(options)),
        }
    }
}
