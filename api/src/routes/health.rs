use axum::{http::StatusCode, response::IntoResponse, routing::get, Extension, Json, Router};
use serde::Serialize;

use project_board_db::object_id::ProjectId;

use crate::shared_state::State;

#[derive(Serialize)]
struct HealthResponse {
    /// If the store answered a query
    store: bool,
    /// If all the other fields indicate healthy status.
    healthy: bool,
}

async fn health(Extension(ref state): Extension<State>) -> impl IntoResponse {
    let store_result = state.projects.get_project(ProjectId::nil()).await;

    (
        StatusCode::OK,
        Json(HealthResponse {
            healthy: store_result.is_ok(),
            store: store_result.is_ok(),
        }),
    )
}

pub fn configure() -> Router {
    Router::new().route("/health", get(health))
}
