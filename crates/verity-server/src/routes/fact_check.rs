use super::{error_response, method_not_allowed};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct FactCheckRequest {
    query: String,
}

#[derive(Debug, Serialize)]
struct FactCheckResponse {
    result: String,
}

// Run a single fact-check, non streaming
async fn handler(
    State(state): State<AppState>,
    payload: Result<Json<FactCheckRequest>, JsonRejection>,
) -> Result<Json<FactCheckResponse>, Response> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected fact-check request");
        error_response(StatusCode::BAD_REQUEST, "Query string is required")
    })?;

    let result = state.fact_checker.fact_check(&request.query).await;
    Ok(Json(FactCheckResponse { result }))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/fact-check", post(handler).fallback(method_not_allowed))
        .with_state(state)
}
