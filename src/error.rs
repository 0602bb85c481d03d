use thiserror::Error;

/// Unified error type for the adapter.
///
/// Validation variants (`Configuration`, `InvalidOptionsType`,
/// `UnrecognizedRole`) are raised before any network dispatch; `Remote`,
/// `Protocol` and `Transport` at or after dispatch. No variant is retried
/// inside this layer — retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// The merged request configuration is unusable (e.g. empty model id).
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The prompt carried an options value of the wrong kind.
    #[error("Prompt options are not of type {expected}")]
    InvalidOptionsType { expected: &'static str },

    /// A role string outside the closed {system, user, assistant} vocabulary.
    #[error("Unrecognized role: {role}")]
    UnrecognizedRole { role: String },

    /// Non-2xx HTTP response from the remote endpoint; body captured verbatim.
    #[error("Remote error: HTTP {status} {status_text} - {body}")]
    Remote {
        status: u16,
        status_text: String,
        body: String,
    },

    /// The response body does not parse as the expected wire shape.
    #[error("Protocol error: {0}")]
    Protocol(#[from] serde_json::Error),

    /// Connection-level failure (DNS, TLS, timeout, broken stream).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl Error {
    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a new unrecognized-role error.
    pub fn unrecognized_role(role: impl Into<String>) -> Self {
        Error::UnrecognizedRole { role: role.into() }
    }
}
