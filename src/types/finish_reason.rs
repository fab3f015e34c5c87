use serde::{Deserialize, Serialize};

/// The reason a completion stopped generating.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model reached a natural stopping point or a stop sequence.
    Stop,

    /// The `max_tokens` limit was reached before the response completed.
    Length,

    /// Content was withheld by the provider's safety filters.
    ContentFilter,
}

impl FinishReason {
    /// Returns true if the response was cut off before completing.
    pub fn is_truncated(&self) -> bool {
        matches!(self, FinishReason::Length)
    }
}
