//! Generation options for the TGI chat endpoint.

use serde::{Deserialize, Serialize};

use crate::types::message::ModelOptions;

/// Model used when neither the client defaults nor the prompt set one.
pub const DEFAULT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";

/// Generation parameters accepted by the chat endpoint.
///
/// Every field is optional so a runtime value can state exactly which
/// parameters it overrides; [`TgiChatOptions::default`] is the complete
/// template the client merges runtime values onto. Options are plain values
/// copied into each request — a client's defaults are never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TgiChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(rename = "top_p", skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    #[serde(rename = "top_k", skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

impl Default for TgiChatOptions {
    /// The default generation template: [`DEFAULT_MODEL`], temperature 0.5,
    /// top_p 0.5, top_k 0.
    fn default() -> Self {
        Self {
            model: Some(DEFAULT_MODEL.to_string()),
            temperature: Some(0.5),
            top_p: Some(0.5),
            top_k: Some(0),
        }
    }
}

impl TgiChatOptions {
    /// An empty options value; set only the fields to override.
    pub fn new() -> Self {
        Self {
            model: None,
            temperature: None,
            top_p: None,
            top_k: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Field-wise merge: each field takes the runtime value when set, the
    /// default otherwise. Total — always yields a complete options value.
    pub fn merge(runtime: Option<&TgiChatOptions>, defaults: &TgiChatOptions) -> TgiChatOptions {
        let runtime = match runtime {
            Some(r) => r,
            None => return defaults.clone(),
        };
        TgiChatOptions {
            model: runtime.model.clone().or_else(|| defaults.model.clone()),
            temperature: runtime.temperature.or(defaults.temperature),
            top_p: runtime.top_p.or(defaults.top_p),
            top_k: runtime.top_k.or(defaults.top_k),
        }
    }

    /// Serialize the fields the server accepts into the request's `options`
    /// map. `model` is client-only (it rides at the request top level) and
    /// is excluded here.
    pub fn to_wire_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        map.remove("model");
        map
    }
}

impl ModelOptions for TgiChatOptions {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
