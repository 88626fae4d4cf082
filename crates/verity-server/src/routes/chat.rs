use super::{error_response, method_not_allowed};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use futures::{stream::StreamExt, Stream};
use serde::Deserialize;
use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use verity::models::message::Message;

/// Appended to the body when generation fails after streaming has started
const ERROR_MARKER: &str = "\n\nError: Failed to generate response";

#[derive(Debug, Deserialize)]
struct ChatRequest {
    messages: Vec<Message>,
}

// Plain-text response body fed chunk by chunk from a channel
pub struct TextStreamResponse {
    rx: ReceiverStream<String>,
}

impl TextStreamResponse {
    fn new(rx: ReceiverStream<String>) -> Self {
        Self { rx }
    }
}

impl Stream for TextStreamResponse {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx)
            .poll_next(cx)
            .map(|opt| opt.map(|s| Ok(Bytes::from(s))))
    }
}

impl IntoResponse for TextStreamResponse {
    fn into_response(self) -> Response {
        let body = axum::body::Body::from_stream(self);

        (
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            body,
        )
            .into_response()
    }
}

async fn handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<TextStreamResponse, Response> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected chat request");
        error_response(StatusCode::BAD_REQUEST, "Messages array is required")
    })?;

    // Create channel for streaming
    let (tx, rx) = mpsc::channel(100);
    let orchestrator = state.orchestrator();
    let messages = request.messages;

    // Spawn task to handle streaming
    tokio::spawn(async move {
        let mut stream = orchestrator.reply(&messages);

        while let Some(response) = stream.next().await {
            match response {
                Ok(text) => {
                    if tx.send(text).await.is_err() {
                        tracing::debug!("Client disconnected, abandoning reply");
                        return;
                    }
                }
                Err(e) => {
                    tracing::error!("Chat generation failed: {}", e);
                    let _ = tx.send(ERROR_MARKER.to_string()).await;
                    return;
                }
            }
        }
    });

    Ok(TextStreamResponse::new(ReceiverStream::new(rx)))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(handler).fallback(method_not_allowed))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use verity::{
        models::{stream::StreamChunk, tool::ToolCall},
        prompt::StaticPrompt,
        providers::mock::{MockProvider, MockResponse},
        GenerationError,
    };

    fn app(provider: &Arc<MockProvider>) -> Router {
        routes(AppState::new(
            provider.clone(),
            "gemini-test".to_string(),
            Arc::new(StaticPrompt::new("Be helpful.")),
            Arc::new(StaticPrompt::new("Check facts.")),
        ))
    }

    fn chat_request(body: &str) -> Request<Body> {
        Request::builder()
            .uri("/api/chat")
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_streams_fact_checked_answer() {
        let provider = Arc::new(MockProvider::new(vec![
            MockResponse::Chunks(vec![StreamChunk::tool_calls(vec![ToolCall::new(
                "fact_check",
                json!({"query": "event X date"}),
            )])]),
            MockResponse::Chunks(vec![StreamChunk::text("Sources confirm 1850.")]),
            MockResponse::Chunks(vec![
                StreamChunk::text("Based on verification, "),
                StreamChunk::text("event X happened in 1850."),
            ]),
        ]));

        let body = json!({"messages": [{"role": "user", "content": "What year did event X happen?"}]});
        let response = app(&provider)
            .oneshot(chat_request(&body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(
            body_text(response).await,
            "Based on verification, event X happened in 1850."
        );
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_missing_messages_is_rejected() {
        let provider = Arc::new(MockProvider::new(vec![]));

        let response = app(&provider).oneshot(chat_request("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body, json!({"error": "Messages array is required"}));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_messages_are_rejected() {
        let provider = Arc::new(MockProvider::new(vec![]));

        for body in [
            r#"{"messages": "not a list"}"#,
            r#"{"messages": [{"role": "user"}]}"#,
            "not json at all",
        ] {
            let response = app(&provider).oneshot(chat_request(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_non_post_is_rejected() {
        let provider = Arc::new(MockProvider::new(vec![]));

        let request = Request::builder()
            .uri("/api/chat")
            .method("GET")
            .body(Body::empty())
            .unwrap();
        let response = app(&provider).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body, json!({"error": "Method not allowed"}));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_appends_marker() {
        let provider = Arc::new(MockProvider::new(vec![MockResponse::FailAfter(
            vec![StreamChunk::text("Partial answer")],
            GenerationError::Stream("connection reset".to_string()),
        )]));

        let body = json!({"messages": [{"role": "user", "content": "Hi"}]});
        let response = app(&provider)
            .oneshot(chat_request(&body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            "Partial answer\n\nError: Failed to generate response"
        );
    }

    #[tokio::test]
    async fn test_unreachable_model_yields_only_marker() {
        let provider = Arc::new(MockProvider::new(vec![MockResponse::Fail(
            GenerationError::Request("dns error".to_string()),
        )]));

        let body = json!({"messages": [{"role": "user", "content": "Hi"}]});
        let response = app(&provider)
            .oneshot(chat_request(&body.to_string()))
            .await
            .unwrap();

        assert_eq!(body_text(response).await, ERROR_MARKER);
    }
}
