// Public modules
pub mod chat_completion;
pub mod chat_completion_chunk;
pub mod chat_message;
pub mod completion_params;
pub mod finish_reason;
pub mod model;
pub mod usage;

// Re-exports
pub use chat_completion::{ChatCompletion, Choice};
pub use chat_completion_chunk::{ChatCompletionChunk, ChunkChoice, MessageDelta};
pub use chat_message::{ChatMessage, Role};
pub use completion_params::CompletionParams;
pub use finish_reason::FinishReason;
pub use model::{KnownModel, Model};
pub use usage::Usage;
