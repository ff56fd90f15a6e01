use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    object_id::{ProjectId, UserId},
    project_assignments::{AssignedDesigner, ProjectAssignment},
    project_files::{NewProjectFile, ProjectFile},
    projects::{NewProject, Project, ProjectUpdate},
    sessions::Session,
    users::{Designer, NewUser, User},
    StoreError,
};

/// Which projects a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFilter {
    All,
    OwnedBy(UserId),
    AssignedTo(UserId),
}

/// The persistence contract for every collection the application owns.
///
/// Implementations own uniqueness and referential integrity: a duplicate
/// assignment or email is reported as [StoreError::Conflict], and a row pointing
/// at a missing project or at a user who is not a designer is reported as
/// [StoreError::MissingReference]. Deleting a project cascades to its files and
/// assignments.
#[async_trait]
pub trait EntityStore: Send + Sync + 'static {
    /// List projects matching the filter, newest first.
    async fn list_projects(&self, filter: ProjectFilter) -> Result<Vec<Project>, StoreError>;
    async fn get_project(&self, project_id: ProjectId) -> Result<Option<Project>, StoreError>;
    async fn insert_project(&self, project: NewProject) -> Result<Project, StoreError>;
    /// Returns `None` if the project does not exist.
    async fn update_project(
        &self,
        project_id: ProjectId,
        update: ProjectUpdate,
    ) -> Result<Option<Project>, StoreError>;
    /// Returns the number of rows removed.
    async fn delete_project(&self, project_id: ProjectId) -> Result<usize, StoreError>;

    /// List the files of all the given projects, oldest first.
    async fn list_project_files(
        &self,
        project_ids: &[ProjectId],
    ) -> Result<Vec<ProjectFile>, StoreError>;
    async fn insert_project_file(&self, file: NewProjectFile) -> Result<ProjectFile, StoreError>;
    async fn delete_project_files(&self, project_id: ProjectId) -> Result<usize, StoreError>;

    async fn insert_assignment(
        &self,
        project_id: ProjectId,
        designer_id: UserId,
    ) -> Result<ProjectAssignment, StoreError>;
    async fn delete_assignment(
        &self,
        project_id: ProjectId,
        designer_id: UserId,
    ) -> Result<usize, StoreError>;
    async fn delete_project_assignments(&self, project_id: ProjectId)
        -> Result<usize, StoreError>;
    /// Every assignment across all projects, joined with the designer's email.
    async fn list_assignments(&self) -> Result<Vec<AssignedDesigner>, StoreError>;
    /// Designers whose email contains `fragment`, ignoring case, ordered by email.
    async fn search_designers(
        &self,
        fragment: &str,
        limit: usize,
    ) -> Result<Vec<Designer>, StoreError>;

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError>;
    /// Emails are matched without regard to case.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn insert_session(&self, session: Session) -> Result<(), StoreError>;
    async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>, StoreError>;
    async fn delete_session(&self, session_id: Uuid) -> Result<usize, StoreError>;
}
