use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::errors::{GenerationError, GenerationResult};
use crate::models::stream::StreamChunk;
use crate::models::tool::Tool;
use crate::models::turn::Turn;
use crate::providers::base::{ChunkStream, CompletionRequest, Provider};

/// One scripted reply of the mock provider
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// The stream yields these chunks and ends
    Chunks(Vec<StreamChunk>),
    /// The stream cannot be established
    Fail(GenerationError),
    /// The stream yields these chunks, then errors
    FailAfter(Vec<StreamChunk>, GenerationError),
}

/// An owned copy of a request the mock provider received
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub model: String,
    pub system: String,
    pub tools: Vec<Tool>,
    pub turns: Vec<Turn>,
}

/// A mock provider that returns pre-configured responses for testing
pub struct MockProvider {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn stream(&self, request: CompletionRequest<'_>) -> GenerationResult<ChunkStream> {
        self.requests.lock().unwrap().push(RecordedRequest {
            model: request.model.to_string(),
            system: request.system.to_string(),
            tools: request.tools.to_vec(),
            turns: request.turns.to_vec(),
        });

        // An exhausted script behaves like an empty stream
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(MockResponse::Chunks(Vec::new()));

        let items: Vec<GenerationResult<StreamChunk>> = match response {
            MockResponse::Chunks(chunks) => chunks.into_iter().map(Ok).collect(),
            MockResponse::Fail(err) => return Err(err),
            MockResponse::FailAfter(chunks, err) => chunks
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(err)))
                .collect(),
        };

        Ok(Box::pin(futures::stream::iter(items)))
    }
}
