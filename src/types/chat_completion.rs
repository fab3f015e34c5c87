use serde::{Deserialize, Serialize};

use crate::types::{ChatMessage, FinishReason, Model, Usage};

/// A non-streaming chat-completions response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletion {
    /// Unique identifier assigned by the provider.
    pub id: String,

    /// The model that produced the completion.
    pub model: Model,

    /// One or more completion choices; the first is the reply.
    pub choices: Vec<Choice>,

    /// Token accounting for this call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// A single completion choice within a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Choice {
    /// Position of this choice in the response.
    pub index: u32,

    /// The assistant message for this choice.
    pub message: ChatMessage,

    /// Why generation stopped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

impl ChatCompletion {
    /// Returns the text of the first choice, the reply the dialogue
    /// continues with.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialization`] when the response carries
    /// no choices, which the API contract does not permit.
    pub fn reply_text(&self) -> crate::Result<&str> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| {
                crate::Error::serialization("response contained no choices", None)
            })
    }
}
