//! The dispatch seam between chat surfaces and the hosted model API.
//!
//! `ChatSession` talks to the API through [`CompletionBackend`] rather than
//! [`Groq`] directly, so tests can drive a session against a scripted
//! backend without a network.

use std::pin::Pin;

use futures::Stream;
use futures::stream::StreamExt;

use crate::client::Groq;
use crate::error::Result;
use crate::types::{ChatCompletion, ChatCompletionChunk, CompletionParams};

/// A boxed stream of completion chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk>> + Send>>;

/// Dispatches a formatted conversation to a hosted model API.
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send the conversation and return the full completion.
    async fn complete(&self, params: CompletionParams) -> Result<ChatCompletion>;

    /// Send the conversation and return a stream of completion chunks.
    async fn stream(&self, params: CompletionParams) -> Result<ChunkStream>;
}

#[async_trait::async_trait]
impl CompletionBackend for Groq {
    async fn complete(&self, params: CompletionParams) -> Result<ChatCompletion> {
        Groq::complete(self, params).await
    }

    async fn stream(&self, params: CompletionParams) -> Result<ChunkStream> {
        let stream = Groq::stream(self, params).await?;
        Ok(stream.boxed())
    }
}
