// Export route modules
pub mod chat;
pub mod fact_check;

use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, Json, Router};
use serde_json::json;

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(chat::routes(state.clone()))
        .merge(fact_check::routes(state))
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn method_not_allowed() -> axum::response::Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
