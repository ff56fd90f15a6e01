use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;

use project_board_db::Role;

use crate::{
    auth::{SessionToken, UserInfo},
    shared_state::State,
    Error,
};

#[derive(Debug, Deserialize)]
struct SignUpInput {
    email: String,
    password: String,
    role: Role,
}

#[derive(Debug, Deserialize)]
struct SignInInput {
    email: String,
    password: String,
}

async fn sign_up(
    Extension(ref state): Extension<State>,
    Json(body): Json<SignUpInput>,
) -> Result<impl IntoResponse, Error> {
    let user = state
        .accounts
        .sign_up(&body.email, &body.password, body.role)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn sign_in(
    Extension(ref state): Extension<State>,
    Json(body): Json<SignInInput>,
) -> Result<impl IntoResponse, Error> {
    let session = state.accounts.sign_in(&body.email, &body.password).await?;
    Ok((StatusCode::OK, Json(session)))
}

async fn sign_out(
    Extension(ref state): Extension<State>,
    SessionToken(token): SessionToken,
) -> Result<impl IntoResponse, Error> {
    state.accounts.sign_out(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me(user: UserInfo) -> impl IntoResponse {
    (StatusCode::OK, Json(user))
}

pub fn configure() -> Router {
    Router::new()
        .route("/sign_up", post(sign_up))
        .route("/sign_in", post(sign_in))
        .route("/sign_out", post(sign_out))
        .route("/me", get(me))
}
