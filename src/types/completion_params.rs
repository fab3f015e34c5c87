use serde::{Deserialize, Serialize};

use crate::types::{ChatMessage, Model};

/// Parameters for a chat-completions request.
///
/// Serializes to the OpenAI-compatible request body accepted by Groq's
/// `chat/completions` endpoint. Fields left unset are omitted from the
/// request so the provider's defaults apply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionParams {
    /// The model that generates the completion.
    pub model: Model,

    /// The full conversation so far, in chronological order.
    ///
    /// An optional system message first, then alternating user and
    /// assistant turns ending with the new user turn.
    pub messages: Vec<ChatMessage>,

    /// The maximum number of tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature, between 0.0 and 2.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus sampling cutoff, between 0.0 and 1.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Sequences at which generation stops.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,

    /// Whether to stream the response as server-sent events.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    #[serde(default)]
    pub stream: bool,
}

impl CompletionParams {
    /// Create parameters for a non-streaming request.
    pub fn new(model: Model, messages: Vec<ChatMessage>) -> Self {
        Self {
            model,
            messages,
            max_tokens: None,
            temperature: None,
            top_p: None,
            stop: None,
            stream: false,
        }
    }

    /// Sets the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the nucleus sampling cutoff.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Sets the stop sequences.
    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Enables streaming for this request.
    pub fn with_stream(mut self) -> Self {
        self.stream = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnownModel;
    use serde_json::{json, to_value};

    #[test]
    fn minimal_request_body() {
        let params = CompletionParams::new(
            Model::Known(KnownModel::Llama33_70bVersatile),
            vec![ChatMessage::user("Hello")],
        );
        let json = to_value(&params).unwrap();

        assert_eq!(
            json,
            json!({
                "model": "llama-3.3-70b-versatile",
                "messages": [{"role": "user", "content": "Hello"}]
            })
        );
    }

    #[test]
    fn full_request_body() {
        let params = CompletionParams::new(
            Model::Known(KnownModel::Llama33_70bVersatile),
            vec![
                ChatMessage::system("You are a sustainability expert."),
                ChatMessage::user("What is LCA?"),
            ],
        )
        .with_max_tokens(800)
        .with_temperature(0.7)
        .with_top_p(0.9)
        .with_stop(vec!["END".to_string()]);

        let json = to_value(&params).unwrap();
        assert_eq!(json["max_tokens"], 800);
        assert_eq!(json["temperature"], 0.7);
        assert_eq!(json["top_p"], 0.9);
        assert_eq!(json["stop"], json!(["END"]));
        assert_eq!(json["messages"][0]["role"], "system");
        assert!(json.get("stream").is_none());
    }

    #[test]
    fn stream_flag_serialized_when_set() {
        let params = CompletionParams::new(
            Model::Known(KnownModel::Llama31_8bInstant),
            vec![ChatMessage::user("Hi")],
        )
        .with_stream();
        let json = to_value(&params).unwrap();
        assert_eq!(json["stream"], true);
    }
}
