//! The state a signed-in user's board works from: the visible projects and who is assigned
//! to them. Every mutation is followed by a full refresh rather than patching the cached
//! lists in place.

use std::{collections::HashMap, sync::Arc};

use tracing::{event, Level};

use project_board_auth::{gate, is_permitted};
use project_board_db::{
    object_id::{ProjectId, UserId},
    users::Designer,
    Role,
};

use crate::{
    auth::UserInfo,
    projects::{FileUpload, ProjectDetails, ProjectInput, ProjectService},
    Error, Result,
};

/// A message to show the user after an action fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Shown next to the input that caused it.
    Field {
        field: &'static str,
        message: String,
    },
    Message(String),
    /// A generic error banner.
    Banner,
}

impl From<&Error> for Notice {
    fn from(e: &Error) -> Self {
        match e {
            Error::Validation { field, message } => Notice::Field {
                field: *field,
                message: message.to_string(),
            },
            Error::Conflict(_) => Notice::Message("That has already been done".to_string()),
            _ => Notice::Banner,
        }
    }
}

/// The result of a board action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    /// The user's role doesn't allow the action, so it was not performed.
    NotPermitted,
    /// The action failed. The failure is in [ProjectBoard::notice].
    Failed,
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }
}

const EDITORS: [Role; 2] = [Role::Manager, Role::Client];

pub struct ProjectBoard {
    service: Arc<ProjectService>,
    user: UserInfo,
    projects: Vec<ProjectDetails>,
    assignments: HashMap<ProjectId, Vec<Designer>>,
    notice: Option<Notice>,
}

impl ProjectBoard {
    pub fn new(service: Arc<ProjectService>, user: UserInfo) -> Self {
        ProjectBoard {
            service,
            user,
            projects: Vec::new(),
            assignments: HashMap::new(),
            notice: None,
        }
    }

    pub fn user(&self) -> &UserInfo {
        &self.user
    }

    pub fn projects(&self) -> &[ProjectDetails] {
        &self.projects
    }

    pub fn designers_for(&self, project_id: ProjectId) -> &[Designer] {
        self.assignments
            .get(&project_id)
            .map(|d| d.as_slice())
            .unwrap_or(&[])
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Refetch the whole project list and assignment map.
    pub async fn refresh(&mut self) -> Result<()> {
        let projects = self
            .service
            .list_projects(self.user.role, self.user.user_id)
            .await?;
        let assignments = self.service.assigned_designers().await?;

        self.projects = projects;
        self.assignments = assignments;
        Ok(())
    }

    fn owns(&self, project_id: ProjectId) -> bool {
        self.projects
            .iter()
            .any(|p| p.project.project_id == project_id && p.project.owner_id == self.user.user_id)
    }

    /// Managers can edit anything, clients only the projects they own.
    pub fn can_edit(&self, project_id: ProjectId) -> bool {
        is_permitted(EDITORS, &self.user.role)
            && (self.user.role == Role::Manager || self.owns(project_id))
    }

    /// Record a failed action as a notice.
    fn fail<T>(&mut self, action: &'static str, e: Error) -> Outcome<T> {
        event!(Level::ERROR, action, error=%e, "Board action failed");
        self.notice = Some(Notice::from(&e));
        Outcome::Failed
    }

    async fn finish<T>(&mut self, action: &'static str, result: Option<Result<T>>) -> Outcome<T> {
        match result {
            None => Outcome::NotPermitted,
            Some(Err(e)) => self.fail(action, e),
            Some(Ok(value)) => {
                self.notice = None;
                match self.refresh().await {
                    Ok(()) => Outcome::Done(value),
                    Err(e) => self.fail(action, e),
                }
            }
        }
    }

    pub async fn create_project(&mut self, input: ProjectInput) -> Outcome<ProjectId> {
        let service = self.service.clone();
        let owner = self.user.user_id;
        let result = gate(Role::Client, &self.user.role, || {
            service.create_or_update(input, owner, None)
        })
        .await;

        self.finish("create_project", result).await
    }

    pub async fn update_project(
        &mut self,
        project_id: ProjectId,
        input: ProjectInput,
    ) -> Outcome<ProjectId> {
        if !self.can_edit(project_id) {
            return Outcome::NotPermitted;
        }

        let service = self.service.clone();
        let owner = self.user.user_id;
        let result = gate(EDITORS, &self.user.role, || {
            service.create_or_update(input, owner, Some(project_id))
        })
        .await;

        self.finish("update_project", result).await
    }

    pub async fn delete_project(&mut self, project_id: ProjectId) -> Outcome<()> {
        if !self.can_edit(project_id) {
            return Outcome::NotPermitted;
        }

        let service = self.service.clone();
        let result = gate(EDITORS, &self.user.role, || service.delete_project(project_id)).await;

        self.finish("delete_project", result).await
    }

    pub async fn attach_files(
        &mut self,
        project_id: ProjectId,
        files: Vec<FileUpload>,
    ) -> Outcome<usize> {
        if !self.can_edit(project_id) {
            return Outcome::NotPermitted;
        }

        let service = self.service.clone();
        let result = gate(EDITORS, &self.user.role, || async move {
            service
                .attach_files(project_id, files)
                .await
                .map(|f| f.len())
        })
        .await;

        self.finish("attach_files", result).await
    }

    /// Replace every file of a project with `files`.
    pub async fn replace_files(
        &mut self,
        project_id: ProjectId,
        files: Vec<FileUpload>,
    ) -> Outcome<usize> {
        if !self.can_edit(project_id) {
            return Outcome::NotPermitted;
        }

        let old_paths = self
            .projects
            .iter()
            .filter(|p| p.project.project_id == project_id)
            .flat_map(|p| p.files.iter().map(|f| f.file.file_url.clone()))
            .collect::<Vec<_>>();

        let service = self.service.clone();
        let result = gate(EDITORS, &self.user.role, || async move {
            service
                .replace_files(project_id, &old_paths, files)
                .await
                .map(|f| f.len())
        })
        .await;

        self.finish("replace_files", result).await
    }

    /// Search designers by email. This doesn't change the board, so there is no refresh.
    pub async fn search_designers(&mut self, fragment: &str) -> Outcome<Vec<Designer>> {
        let service = self.service.clone();
        let result = gate(Role::Manager, &self.user.role, || {
            service.search_designers_by_email(fragment)
        })
        .await;

        match result {
            None => Outcome::NotPermitted,
            Some(Ok(designers)) => Outcome::Done(designers),
            Some(Err(e)) => self.fail("search_designers", e),
        }
    }

    pub async fn assign(&mut self, project_id: ProjectId, designer_id: UserId) -> Outcome<()> {
        let service = self.service.clone();
        let result = gate(Role::Manager, &self.user.role, || {
            service.assign(project_id, designer_id)
        })
        .await;

        self.finish("assign", result).await
    }

    pub async fn unassign(&mut self, project_id: ProjectId, designer_id: UserId) -> Outcome<()> {
        let service = self.service.clone();
        let result = gate(Role::Manager, &self.user.role, || {
            service.unassign(project_id, designer_id)
        })
        .await;

        self.finish("unassign", result).await
    }
}
