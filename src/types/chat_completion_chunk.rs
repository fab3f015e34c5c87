use serde::{Deserialize, Serialize};

use crate::types::{FinishReason, Model, Role, Usage};

/// One server-sent event of a streaming chat-completions response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionChunk {
    /// Unique identifier shared by all chunks of one response.
    pub id: String,

    /// The model that produced the completion.
    pub model: Model,

    /// Incremental choices; the first carries the delta for the reply.
    pub choices: Vec<ChunkChoice>,

    /// Token accounting, present on the final chunk when the provider
    /// reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// A single choice within a streaming chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkChoice {
    /// Position of this choice in the response.
    pub index: u32,

    /// The incremental message content.
    pub delta: MessageDelta,

    /// Set on the final chunk of a choice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

/// The incremental part of an assistant message.
///
/// The first chunk of a stream carries the role; subsequent chunks carry
/// content fragments; the final chunk carries neither.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MessageDelta {
    /// The role, present on the first chunk only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// A fragment of the reply text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    /// Returns the text fragment carried by this chunk, if any.
    pub fn delta_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
    }

    /// Returns the finish reason if this is the final chunk of the reply.
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.choices.first().and_then(|choice| choice.finish_reason)
    }
}
