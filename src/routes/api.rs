//! Adapter from axum to the resource handler for everything under `/api`.

use crate::handlers::dispatch;
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{extract::State, http::Method, http::Uri, routing::any, Router};

async fn api(State(state): State<AppState>, method: Method, uri: Uri, body: String) -> ApiResponse {
    dispatch(&state, &method, uri.path(), &body).await
}

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api", any(api))
        .route("/api/*rest", any(api))
        .with_state(state)
}
