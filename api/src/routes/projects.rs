use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use serde_json::json;

use project_board_db::{object_id::ProjectId, projects::Project, Role};

use crate::{
    auth::{can_view_project, must_have_role, must_modify_project, UserInfo},
    projects::ProjectInput,
    shared_state::State,
    Error,
};

pub(super) async fn existing_project(state: &State, project_id: ProjectId) -> Result<Project, Error> {
    state
        .projects
        .get_project(project_id)
        .await?
        .ok_or(Error::ObjectNotFound("project"))
}

async fn list_projects(
    Extension(ref state): Extension<State>,
    user: UserInfo,
) -> Result<impl IntoResponse, Error> {
    let projects = state
        .projects
        .list_projects(user.role, user.user_id)
        .await?;
    Ok((StatusCode::OK, Json(projects)))
}

async fn get_project(
    Extension(ref state): Extension<State>,
    user: UserInfo,
    Path(project_id): Path<ProjectId>,
) -> Result<impl IntoResponse, Error> {
    let details = state
        .projects
        .project_details(project_id)
        .await?
        .ok_or(Error::ObjectNotFound("project"))?;

    let assigned = state
        .projects
        .assigned_designers()
        .await?
        .remove(&project_id)
        .unwrap_or_default();
    let assigned_ids = assigned.iter().map(|d| d.id).collect::<Vec<_>>();

    if !can_view_project(&user, &details.project, &assigned_ids) {
        // Don't reveal that the project exists.
        return Err(Error::ObjectNotFound("project"));
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "project": details,
            "designers": assigned,
        })),
    ))
}

async fn new_project(
    Extension(ref state): Extension<State>,
    user: UserInfo,
    Json(body): Json<ProjectInput>,
) -> Result<impl IntoResponse, Error> {
    must_have_role(&user, Role::Client)?;
    let project_id = state
        .projects
        .create_or_update(body, user.user_id, None)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": project_id }))))
}

async fn write_project(
    Extension(ref state): Extension<State>,
    user: UserInfo,
    Path(project_id): Path<ProjectId>,
    Json(body): Json<ProjectInput>,
) -> Result<impl IntoResponse, Error> {
    let project = existing_project(state, project_id).await?;
    must_modify_project(&user, &project)?;

    let project_id = state
        .projects
        .create_or_update(body, project.owner_id, Some(project_id))
        .await?;
    Ok((StatusCode::OK, Json(json!({ "id": project_id }))))
}

async fn delete_project(
    Extension(ref state): Extension<State>,
    user: UserInfo,
    Path(project_id): Path<ProjectId>,
) -> Result<impl IntoResponse, Error> {
    match state.projects.get_project(project_id).await? {
        Some(project) => must_modify_project(&user, &project)?,
        None if user.role == Role::Designer => return Err(Error::Forbidden),
        None => {}
    }

    state.projects.delete_project(project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn configure() -> Router {
    Router::new()
        .route("/", get(list_projects).post(new_project))
        .route(
            "/:project_id",
            put(write_project).get(get_project).delete(delete_project),
        )
}
