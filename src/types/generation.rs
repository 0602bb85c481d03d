//! Generic generation output shapes produced by the adapter.

/// Token accounting reported by the server, when available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub generation_tokens: u64,
}

/// One unit of produced text output.
///
/// One-shot calls yield exactly one; streaming yields one per chunk,
/// carrying only that chunk's incremental text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub usage: Option<Usage>,
}

impl Generation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Adapter output: an ordered sequence of one or more generations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResponse {
    pub generations: Vec<Generation>,
}

impl GenerationResponse {
    pub fn new(generations: Vec<Generation>) -> Self {
        Self { generations }
    }
}
