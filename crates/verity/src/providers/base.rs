use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::errors::GenerationResult;
use crate::models::stream::StreamChunk;
use crate::models::tool::Tool;
use crate::models::turn::Turn;

/// The chunks of a single streaming generation, in arrival order
pub type ChunkStream = BoxStream<'static, GenerationResult<StreamChunk>>;

/// Everything a provider needs for one streaming generation
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub system: &'a str,
    /// Tools the model may invoke; empty for requests that declare none
    pub tools: &'a [Tool],
    pub turns: &'a [Turn],
}

/// Base trait for streaming model providers
#[async_trait]
pub trait Provider: Send + Sync {
    /// Start a streaming generation.
    ///
    /// Fails when the stream cannot be established; failures after that point are
    /// reported as error items of the returned stream.
    async fn stream(&self, request: CompletionRequest<'_>) -> GenerationResult<ChunkStream>;
}
