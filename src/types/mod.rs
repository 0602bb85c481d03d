//! Provider-agnostic types: prompts, messages, and generation results.

pub mod generation;
pub mod message;

pub use generation::{Generation, GenerationResponse, Usage};
pub use message::{Message, MessageType, ModelOptions, Prompt};
