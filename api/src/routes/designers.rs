use axum::{
    extract::Query, http::StatusCode, response::IntoResponse, routing::get, Extension, Json,
    Router,
};
use serde::Deserialize;

use project_board_db::Role;

use crate::{
    auth::{must_have_role, UserInfo},
    shared_state::State,
    Error,
};

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    email: String,
}

async fn search_designers(
    Extension(ref state): Extension<State>,
    user: UserInfo,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, Error> {
    must_have_role(&user, Role::Manager)?;
    let designers = state
        .projects
        .search_designers_by_email(&query.email)
        .await?;
    Ok((StatusCode::OK, Json(designers)))
}

pub fn configure() -> Router {
    Router::new().route("/designers", get(search_designers))
}
