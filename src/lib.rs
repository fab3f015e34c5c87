// Public modules
pub mod backend;
pub mod chat;
pub mod client;
pub mod error;
pub mod observability;
pub mod types;
pub mod web;

// Re-exports
pub use backend::{ChunkStream, CompletionBackend};
pub use client::Groq;
pub use error::{Error, Result};
pub use types::*;
