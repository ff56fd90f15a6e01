use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    object_id::{ProjectId, UserId},
    project_assignments::{AssignedDesigner, ProjectAssignment},
    project_files::{NewProjectFile, ProjectFile},
    projects::{NewProject, Project, ProjectUpdate},
    sessions::Session,
    users::{Designer, NewUser, User},
    EntityStore, ProjectFilter, Role, StoreError,
};

#[derive(Default)]
struct Tables {
    projects: Vec<Project>,
    files: Vec<ProjectFile>,
    assignments: Vec<ProjectAssignment>,
    users: Vec<User>,
    sessions: HashMap<Uuid, Session>,
}

impl Tables {
    fn project_exists(&self, project_id: ProjectId) -> bool {
        self.projects.iter().any(|p| p.project_id == project_id)
    }

    fn user(&self, user_id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.user_id == user_id)
    }
}

/// An [EntityStore] that lives in process memory, enforcing the same
/// constraints as the database schema. Used when no database is configured and
/// as the store for tests.
///
/// Every call is appended to an operation log, which tests use to verify which
/// store calls an operation made.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    operations: Mutex<Vec<&'static str>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self, operation: &'static str) -> MutexGuard<'_, Tables> {
        self.operations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(operation);
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The names of the store operations called so far, in order.
    pub fn operations(&self) -> Vec<&'static str> {
        self.operations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn clear_operations(&self) {
        self.operations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn list_projects(&self, filter: ProjectFilter) -> Result<Vec<Project>, StoreError> {
        let tables = self.tables("list_projects");

        // Walk newest-inserted first so that the stable sort keeps that order for
        // projects created in the same instant.
        let mut projects = tables
            .projects
            .iter()
            .rev()
            .filter(|p| match filter {
                ProjectFilter::All => true,
                ProjectFilter::OwnedBy(owner) => p.owner_id == owner,
                ProjectFilter::AssignedTo(designer) => tables
                    .assignments
                    .iter()
                    .any(|a| a.project_id == p.project_id && a.designer_id == designer),
            })
            .cloned()
            .collect::<Vec<_>>();

        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn get_project(&self, project_id: ProjectId) -> Result<Option<Project>, StoreError> {
        let tables = self.tables("get_project");
        Ok(tables
            .projects
            .iter()
            .find(|p| p.project_id == project_id)
            .cloned())
    }

    async fn insert_project(&self, project: NewProject) -> Result<Project, StoreError> {
        let mut tables = self.tables("insert_project");
        if tables.user(project.owner_id).is_none() {
            return Err(StoreError::MissingReference("user".to_string()));
        }

        if tables.project_exists(project.project_id) {
            return Err(StoreError::Conflict("projects".to_string()));
        }

        let project = Project {
            project_id: project.project_id,
            owner_id: project.owner_id,
            title: project.title,
            description: project.description,
            created_at: project.created_at,
            updated: project.updated,
        };

        tables.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        project_id: ProjectId,
        update: ProjectUpdate,
    ) -> Result<Option<Project>, StoreError> {
        let mut tables = self.tables("update_project");
        let project = tables
            .projects
            .iter_mut()
            .find(|p| p.project_id == project_id)
            .map(|p| {
                p.title = update.title;
                p.description = update.description;
                p.updated = update.updated;
                p.clone()
            });

        Ok(project)
    }

    async fn delete_project(&self, project_id: ProjectId) -> Result<usize, StoreError> {
        let mut tables = self.tables("delete_project");
        let before = tables.projects.len();
        tables.projects.retain(|p| p.project_id != project_id);
        let removed = before - tables.projects.len();

        if removed > 0 {
            tables.files.retain(|f| f.project_id != project_id);
            tables.assignments.retain(|a| a.project_id != project_id);
        }

        Ok(removed)
    }

    async fn list_project_files(
        &self,
        project_ids: &[ProjectId],
    ) -> Result<Vec<ProjectFile>, StoreError> {
        let tables = self.tables("list_project_files");
        Ok(tables
            .files
            .iter()
            .filter(|f| project_ids.contains(&f.project_id))
            .cloned()
            .collect())
    }

    async fn insert_project_file(&self, file: NewProjectFile) -> Result<ProjectFile, StoreError> {
        let mut tables = self.tables("insert_project_file");
        if !tables.project_exists(file.project_id) {
            return Err(StoreError::MissingReference("project".to_string()));
        }

        if tables.files.iter().any(|f| {
            f.project_file_id == file.project_file_id || f.file_url == file.file_url
        }) {
            return Err(StoreError::Conflict("project_files".to_string()));
        }

        let file = ProjectFile {
            project_file_id: file.project_file_id,
            project_id: file.project_id,
            file_name: file.file_name,
            file_url: file.file_url,
            file_size: file.file_size,
            file_type: file.file_type,
            created_at: file.created_at,
        };

        tables.files.push(file.clone());
        Ok(file)
    }

    async fn delete_project_files(&self, project_id: ProjectId) -> Result<usize, StoreError> {
        let mut tables = self.tables("delete_project_files");
        let before = tables.files.len();
        tables.files.retain(|f| f.project_id != project_id);
        Ok(before - tables.files.len())
    }

    async fn insert_assignment(
        &self,
        project_id: ProjectId,
        designer_id: UserId,
    ) -> Result<ProjectAssignment, StoreError> {
        let mut tables = self.tables("insert_assignment");
        if !tables.project_exists(project_id) {
            return Err(StoreError::MissingReference("project".to_string()));
        }

        match tables.user(designer_id) {
            Some(user) if user.role == Role::Designer => {}
            _ => return Err(StoreError::MissingReference("designer".to_string())),
        }

        if tables
            .assignments
            .iter()
            .any(|a| a.project_id == project_id && a.designer_id == designer_id)
        {
            return Err(StoreError::Conflict("project_assignments".to_string()));
        }

        let assignment = ProjectAssignment {
            project_id,
            designer_id,
            created_at: Utc::now(),
        };

        tables.assignments.push(assignment.clone());
        Ok(assignment)
    }

    async fn delete_assignment(
        &self,
        project_id: ProjectId,
        designer_id: UserId,
    ) -> Result<usize, StoreError> {
        let mut tables = self.tables("delete_assignment");
        let before = tables.assignments.len();
        tables
            .assignments
            .retain(|a| !(a.project_id == project_id && a.designer_id == designer_id));
        Ok(before - tables.assignments.len())
    }

    async fn delete_project_assignments(
        &self,
        project_id: ProjectId,
    ) -> Result<usize, StoreError> {
        let mut tables = self.tables("delete_project_assignments");
        let before = tables.assignments.len();
        tables.assignments.retain(|a| a.project_id != project_id);
        Ok(before - tables.assignments.len())
    }

    async fn list_assignments(&self) -> Result<Vec<AssignedDesigner>, StoreError> {
        let tables = self.tables("list_assignments");
        let rows = tables
            .assignments
            .iter()
            .filter_map(|a| {
                tables.user(a.designer_id).map(|u| AssignedDesigner {
                    project_id: a.project_id,
                    designer_id: a.designer_id,
                    designer_email: u.email.clone(),
                })
            })
            .collect();

        Ok(rows)
    }

    async fn search_designers(
        &self,
        fragment: &str,
        limit: usize,
    ) -> Result<Vec<Designer>, StoreError> {
        let tables = self.tables("search_designers");
        let fragment = fragment.to_lowercase();

        let mut designers = tables
            .users
            .iter()
            .filter(|u| u.role == Role::Designer && u.email.to_lowercase().contains(&fragment))
            .map(|u| Designer {
                id: u.user_id,
                email: u.email.clone(),
            })
            .collect::<Vec<_>>();

        designers.sort_by(|a, b| a.email.cmp(&b.email));
        designers.truncate(limit);
        Ok(designers)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables("insert_user");
        if tables.users.iter().any(|u| {
            u.user_id == user.user_id || u.email.eq_ignore_ascii_case(&user.email)
        }) {
            return Err(StoreError::Conflict("users".to_string()));
        }

        let user = User {
            user_id: user.user_id,
            email: user.email,
            role: user.role,
            password_hash: user.password_hash,
            created: Utc::now(),
        };

        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        let tables = self.tables("get_user");
        Ok(tables.user(user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables("find_user_by_email");
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_session(&self, session: Session) -> Result<(), StoreError> {
        let mut tables = self.tables("insert_session");
        if tables.user(session.user_id).is_none() {
            return Err(StoreError::MissingReference("user".to_string()));
        }

        if tables.sessions.contains_key(&session.session_id) {
            return Err(StoreError::Conflict("sessions".to_string()));
        }

        tables.sessions.insert(session.session_id, session);
        Ok(())
    }

    async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>, StoreError> {
        let tables = self.tables("get_session");
        Ok(tables.sessions.get(&session_id).cloned())
    }

    async fn delete_session(&self, session_id: Uuid) -> Result<usize, StoreError> {
        let mut tables = self.tables("delete_session");
        Ok(tables.sessions.remove(&session_id).map(|_| 1).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn conformance() {
        crate::store_tests::run_all(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn records_operations() {
        let store = MemoryStore::new();
        store.list_projects(ProjectFilter::All).await.unwrap();
        store.search_designers("abc", 5).await.unwrap();
        assert_eq!(store.operations(), vec!["list_projects", "search_designers"]);

        store.clear_operations();
        assert!(store.operations().is_empty());
    }
}
