use async_trait::async_trait;
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::future;
use futures::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};

use super::base::{ChunkStream, CompletionRequest, Provider};
use super::configs::GeminiProviderConfig;
use super::utils::{gemini_response_to_chunk, tools_to_gemini_spec, turns_to_gemini_spec};
use crate::errors::{GenerationError, GenerationResult};
use crate::models::stream::StreamChunk;

/// Streams generations from the Gemini `streamGenerateContent` endpoint over SSE
pub struct GeminiProvider {
    client: Client,
    config: GeminiProviderConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiProviderConfig) -> GenerationResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    fn build_payload(&self, request: &CompletionRequest<'_>) -> GenerationResult<Value> {
        let mut payload = json!({
            "systemInstruction": {
                "parts": [{"text": request.system}]
            },
            "contents": turns_to_gemini_spec(request.turns),
        });

        let tools_spec = tools_to_gemini_spec(request.tools)?;
        if !tools_spec.is_empty() {
            payload["tools"] = json!(tools_spec);
        }

        let mut generation_config = json!({"responseMimeType": "text/plain"});
        if let Some(temp) = self.config.temperature {
            generation_config["temperature"] = json!(temp);
        }
        if let Some(tokens) = self.config.max_tokens {
            generation_config["maxOutputTokens"] = json!(tokens);
        }
        payload["generationConfig"] = generation_config;

        Ok(payload)
    }

    async fn post(&self, model: &str, payload: &Value) -> GenerationResult<reqwest::Response> {
        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.config.host.trim_end_matches('/'),
            model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Turn one SSE event into a chunk, skipping keep-alives and blank frames
fn event_to_chunk(
    event: Result<Event, EventStreamError<reqwest::Error>>,
) -> Option<GenerationResult<StreamChunk>> {
    let event = match event {
        Ok(event) => event,
        Err(err) => return Some(Err(GenerationError::Stream(err.to_string()))),
    };

    let data = event.data.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    Some(
        serde_json::from_str::<Value>(data)
            .map_err(GenerationError::from)
            .and_then(|response| gemini_response_to_chunk(&response)),
    )
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn stream(&self, request: CompletionRequest<'_>) -> GenerationResult<ChunkStream> {
        let payload = self.build_payload(&request)?;
        let response = self.post(request.model, &payload).await?;

        let stream = response
            .bytes_stream()
            .eventsource()
            .filter_map(|event| future::ready(event_to_chunk(event)));

        Ok(Box::pin(stream))
    }
}
