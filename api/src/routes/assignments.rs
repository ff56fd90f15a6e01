use std::collections::HashSet;

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};

use project_board_db::{
    object_id::{ProjectId, UserId},
    Role,
};

use crate::{
    auth::{must_have_role, UserInfo},
    shared_state::State,
    Error,
};

/// The designers assigned to each project the user can see.
async fn list_assignments(
    Extension(ref state): Extension<State>,
    user: UserInfo,
) -> Result<impl IntoResponse, Error> {
    let mut assignments = state.projects.assigned_designers().await?;

    if user.role != Role::Manager {
        let visible = state
            .projects
            .list_projects(user.role, user.user_id)
            .await?
            .into_iter()
            .map(|p| p.project.project_id)
            .collect::<HashSet<_>>();
        assignments.retain(|project_id, _| visible.contains(project_id));
    }

    Ok((StatusCode::OK, Json(assignments)))
}

async fn assign(
    Extension(ref state): Extension<State>,
    user: UserInfo,
    Path((project_id, designer_id)): Path<(ProjectId, UserId)>,
) -> Result<impl IntoResponse, Error> {
    must_have_role(&user, Role::Manager)?;
    state.projects.assign(project_id, designer_id).await?;
    Ok(StatusCode::CREATED)
}

async fn unassign(
    Extension(ref state): Extension<State>,
    user: UserInfo,
    Path((project_id, designer_id)): Path<(ProjectId, UserId)>,
) -> Result<impl IntoResponse, Error> {
    must_have_role(&user, Role::Manager)?;
    state.projects.unassign(project_id, designer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn configure() -> Router {
    Router::new().route("/assignments", get(list_assignments))
}

/// Routes nested under `/projects`.
pub fn project_routes() -> Router {
    Router::new().route(
        "/:project_id/designers/:designer_id",
        post(assign).delete(unassign),
    )
}
