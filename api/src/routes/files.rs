use axum::{
    extract::{DefaultBodyLimit, Multipart, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};

use project_board_db::object_id::ProjectId;

use crate::{
    auth::{must_modify_project, UserInfo},
    projects::{FileUpload, MAX_FILE_SIZE},
    shared_state::State,
    Error,
};

use super::projects::existing_project;

/// How many maximum-size files one request can carry.
const MAX_FILES_PER_REQUEST: usize = 4;

async fn read_files(mut multipart: Multipart) -> Result<Vec<FileUpload>, Error> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        // Skip plain form fields.
        let Some(file_name) = field.file_name().map(String::from) else {
            continue;
        };

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await?;

        files.push(FileUpload {
            file_name,
            content_type,
            data,
        });
    }

    Ok(files)
}

async fn attach_files(
    Extension(ref state): Extension<State>,
    user: UserInfo,
    Path(project_id): Path<ProjectId>,
    multipart: Multipart,
) -> Result<impl IntoResponse, Error> {
    let project = existing_project(state, project_id).await?;
    must_modify_project(&user, &project)?;

    let files = read_files(multipart).await?;
    let files = state
        .projects
        .attach_files(project_id, files)
        .await?
        .into_iter()
        .map(|f| state.projects.file_details(f))
        .collect::<Vec<_>>();
    Ok((StatusCode::CREATED, Json(files)))
}

async fn replace_files(
    Extension(ref state): Extension<State>,
    user: UserInfo,
    Path(project_id): Path<ProjectId>,
    multipart: Multipart,
) -> Result<impl IntoResponse, Error> {
    let details = state
        .projects
        .project_details(project_id)
        .await?
        .ok_or(Error::ObjectNotFound("project"))?;
    must_modify_project(&user, &details.project)?;

    let old_paths = details
        .files
        .into_iter()
        .map(|f| f.file.file_url)
        .collect::<Vec<_>>();
    let files = read_files(multipart).await?;
    let files = state
        .projects
        .replace_files(project_id, &old_paths, files)
        .await?
        .into_iter()
        .map(|f| state.projects.file_details(f))
        .collect::<Vec<_>>();
    Ok((StatusCode::OK, Json(files)))
}

pub fn configure() -> Router {
    Router::new()
        .route(
            "/:project_id/files",
            post(attach_files).put(replace_files),
        )
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE * MAX_FILES_PER_REQUEST))
}
