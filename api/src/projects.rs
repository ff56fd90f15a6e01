use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{event, instrument, Level};
use uuid::Uuid;

use project_board_db::{
    object_id::{ProjectFileId, ProjectId, UserId},
    project_files::{NewProjectFile, ProjectFile},
    projects::{NewProject, Project, ProjectUpdate},
    users::Designer,
    EntityStore, ProjectFilter, Role,
};
use project_board_storage::{BlobStore, UploadOptions};

use crate::{Error, Result};

pub const MIN_TITLE_LENGTH: usize = 3;
pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;
pub const DESIGNER_SEARCH_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A file to attach to a project.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileDetails {
    #[serde(flatten)]
    pub file: ProjectFile,
    pub public_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetails {
    #[serde(flatten)]
    pub project: Project,
    pub files: Vec<FileDetails>,
}

/// Project CRUD, file attachments, and designer assignment over an [EntityStore] and a
/// [BlobStore]. Every call to either is bounded by the configured timeout.
pub struct ProjectService {
    store: Arc<dyn EntityStore>,
    blobs: Arc<dyn BlobStore>,
    timeout: Option<Duration>,
}

impl ProjectService {
    pub fn new(
        store: Arc<dyn EntityStore>,
        blobs: Arc<dyn BlobStore>,
        timeout: Option<Duration>,
    ) -> Self {
        ProjectService {
            store,
            blobs,
            timeout,
        }
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    async fn timed<T, E>(&self, fut: impl Future<Output = std::result::Result<T, E>>) -> Result<T>
    where
        Error: From<E>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| Error::Timeout)?
                .map_err(Error::from),
            None => fut.await.map_err(Error::from),
        }
    }

    /// List the projects visible to a user: clients see the projects they own, designers
    /// see the projects they are assigned to, and managers see everything.
    #[instrument(skip(self))]
    pub async fn list_projects(&self, role: Role, user_id: UserId) -> Result<Vec<ProjectDetails>> {
        let filter = match role {
            Role::Client => ProjectFilter::OwnedBy(user_id),
            Role::Designer => ProjectFilter::AssignedTo(user_id),
            Role::Manager => ProjectFilter::All,
        };

        let projects = self.timed(self.store.list_projects(filter)).await?;
        if projects.is_empty() {
            return Ok(Vec::new());
        }

        let ids = projects.iter().map(|p| p.project_id).collect::<Vec<_>>();
        let mut files_by_project: HashMap<ProjectId, Vec<FileDetails>> = HashMap::new();
        for file in self.timed(self.store.list_project_files(&ids)).await? {
            files_by_project
                .entry(file.project_id)
                .or_default()
                .push(self.file_details(file));
        }

        let details = projects
            .into_iter()
            .map(|project| ProjectDetails {
                files: files_by_project
                    .remove(&project.project_id)
                    .unwrap_or_default(),
                project,
            })
            .collect();

        Ok(details)
    }

    pub async fn get_project(&self, project_id: ProjectId) -> Result<Option<Project>> {
        self.timed(self.store.get_project(project_id)).await
    }

    /// A single project with its files.
    pub async fn project_details(&self, project_id: ProjectId) -> Result<Option<ProjectDetails>> {
        let Some(project) = self.get_project(project_id).await? else {
            return Ok(None);
        };

        let files = self
            .timed(self.store.list_project_files(&[project_id]))
            .await?
            .into_iter()
            .map(|file| self.file_details(file))
            .collect();

        Ok(Some(ProjectDetails { project, files }))
    }

    /// Create a project owned by `owner_id`, or update `existing_id` in place.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_or_update(
        &self,
        input: ProjectInput,
        owner_id: UserId,
        existing_id: Option<ProjectId>,
    ) -> Result<ProjectId> {
        let title = input.title.trim();
        if title.chars().count() < MIN_TITLE_LENGTH {
            return Err(Error::validation(
                "title",
                "Title must be at least 3 characters long",
            ));
        }

        let title = title.to_string();
        let description = input.description.filter(|d| !d.trim().is_empty());

        match existing_id {
            Some(project_id) => {
                let update = ProjectUpdate::new(title, description);
                self.timed(self.store.update_project(project_id, update))
                    .await?
                    .ok_or(Error::ObjectNotFound("project"))?;
                event!(Level::INFO, %project_id, "Updated project");
                Ok(project_id)
            }
            None => {
                let project = NewProject::new(owner_id, title, description);
                let project = self.timed(self.store.insert_project(project)).await?;
                event!(Level::INFO, project_id=%project.project_id, "Created project");
                Ok(project.project_id)
            }
        }
    }

    /// Delete a project along with its files and assignments. Deleting a project that
    /// doesn't exist does nothing.
    #[instrument(skip(self))]
    pub async fn delete_project(&self, project_id: ProjectId) -> Result<()> {
        if self.get_project(project_id).await?.is_none() {
            return Ok(());
        }

        let paths = self
            .timed(self.store.list_project_files(&[project_id]))
            .await?
            .into_iter()
            .map(|f| f.file_url)
            .collect::<Vec<_>>();

        if !paths.is_empty() {
            self.timed(self.blobs.remove(&paths)).await?;
            self.timed(self.store.delete_project_files(project_id))
                .await?;
        }

        self.timed(self.store.delete_project_assignments(project_id))
            .await?;
        self.timed(self.store.delete_project(project_id)).await?;

        event!(Level::INFO, files = paths.len(), "Deleted project");
        Ok(())
    }

    /// Upload files and record them against the project.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn attach_files(
        &self,
        project_id: ProjectId,
        files: Vec<FileUpload>,
    ) -> Result<Vec<ProjectFile>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        self.check_uploads(project_id, &files).await?;

        let mut recorded = Vec::with_capacity(files.len());
        for file in files {
            recorded.push(self.store_file(project_id, file).await?);
        }

        Ok(recorded)
    }

    /// Size limits first, then that the project exists. Nothing is changed.
    async fn check_uploads(&self, project_id: ProjectId, files: &[FileUpload]) -> Result<()> {
        if let Some(file) = files.iter().find(|f| f.data.len() > MAX_FILE_SIZE) {
            return Err(Error::validation(
                "files",
                format!("{} is larger than the 50 MiB limit", file.file_name),
            ));
        }

        if self.get_project(project_id).await?.is_none() {
            return Err(Error::ObjectNotFound("project"));
        }

        Ok(())
    }

    /// Upload one file and record it. If recording fails, the uploaded blob is removed again.
    async fn store_file(&self, project_id: ProjectId, file: FileUpload) -> Result<ProjectFile> {
        let key = blob_key(project_id, &file.file_name);
        let file_size = file.data.len() as i64;

        self.timed(
            self.blobs
                .upload(&key, file.data, UploadOptions { upsert: false }),
        )
        .await?;

        let record = NewProjectFile {
            project_file_id: ProjectFileId::new(),
            project_id,
            file_name: file.file_name,
            file_url: key.clone(),
            file_size,
            file_type: file.content_type,
            created_at: Utc::now(),
        };

        match self.timed(self.store.insert_project_file(record)).await {
            Ok(file) => Ok(file),
            Err(e) => {
                match self.timed(self.blobs.remove(&[key.clone()])).await {
                    Ok(()) => {
                        event!(Level::WARN, %key, error=%e, "Removed blob after failing to record it")
                    }
                    Err(remove_err) => {
                        event!(Level::ERROR, %key, error=%e, %remove_err, "Failed to remove unrecorded blob")
                    }
                }
                Err(e)
            }
        }
    }

    /// Replace all of a project's files. The old blobs are removed before the new ones are
    /// uploaded, and the two steps are not atomic.
    #[instrument(skip(self, new_files))]
    pub async fn replace_files(
        &self,
        project_id: ProjectId,
        old_paths: &[String],
        new_files: Vec<FileUpload>,
    ) -> Result<Vec<ProjectFile>> {
        let prefix = project_prefix(project_id);
        if let Some(path) = old_paths.iter().find(|p| !p.starts_with(&prefix)) {
            return Err(Error::validation(
                "files",
                format!("{path} does not belong to this project"),
            ));
        }

        // A rejected replacement leaves the current files alone.
        self.check_uploads(project_id, &new_files).await?;

        if !old_paths.is_empty() {
            self.timed(self.blobs.remove(old_paths)).await?;
        }

        self.timed(self.store.delete_project_files(project_id))
            .await?;
        self.attach_files(project_id, new_files).await
    }

    /// Find up to five designers whose email contains `fragment`.
    pub async fn search_designers_by_email(&self, fragment: &str) -> Result<Vec<Designer>> {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return Ok(Vec::new());
        }

        self.timed(
            self.store
                .search_designers(fragment, DESIGNER_SEARCH_LIMIT),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn assign(&self, project_id: ProjectId, designer_id: UserId) -> Result<()> {
        self.timed(self.store.insert_assignment(project_id, designer_id))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn unassign(&self, project_id: ProjectId, designer_id: UserId) -> Result<()> {
        self.timed(self.store.delete_assignment(project_id, designer_id))
            .await?;
        Ok(())
    }

    /// The designers assigned to each project that has any.
    pub async fn assigned_designers(&self) -> Result<HashMap<ProjectId, Vec<Designer>>> {
        let rows = self.timed(self.store.list_assignments()).await?;

        let mut map: HashMap<ProjectId, Vec<Designer>> = HashMap::new();
        for row in rows {
            map.entry(row.project_id).or_default().push(Designer {
                id: row.designer_id,
                email: row.designer_email,
            });
        }

        Ok(map)
    }

    pub fn public_url(&self, file: &ProjectFile) -> String {
        self.blobs.public_url(&file.file_url)
    }

    pub fn file_details(&self, file: ProjectFile) -> FileDetails {
        FileDetails {
            public_url: self.public_url(&file),
            file,
        }
    }
}

fn project_prefix(project_id: ProjectId) -> String {
    format!("projects/{project_id}/")
}

/// A fresh storage key for a project file, keeping the original extension.
fn blob_key(project_id: ProjectId, file_name: &str) -> String {
    let random = Uuid::new_v4().simple();
    let ext = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase());

    match ext {
        Some(ext) => format!("{}{random}.{ext}", project_prefix(project_id)),
        None => format!("{}{random}", project_prefix(project_id)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use project_board_db::{users::NewUser, MemoryStore};
    use project_board_storage::{Operator, ProviderConfig};

    use super::*;

    /// Records every blob call in order, delegating to an in-memory store.
    struct RecordingBlobs {
        inner: Operator,
        calls: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    impl RecordingBlobs {
        fn new() -> Self {
            RecordingBlobs {
                inner: ProviderConfig::Memory
                    .create_operator("https://files.test")
                    .unwrap(),
                calls: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        fn local(root: &std::path::Path) -> Self {
            RecordingBlobs {
                inner: ProviderConfig::Local {
                    root: root.to_path_buf(),
                }
                .create_operator("/files")
                .unwrap(),
                calls: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BlobStore for RecordingBlobs {
        async fn upload(
            &self,
            path: &str,
            bytes: Bytes,
            options: UploadOptions,
        ) -> project_board_storage::Result<()> {
            self.calls.lock().unwrap().push(format!("upload {path}"));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.inner.upload(path, bytes, options).await
        }

        async fn remove(&self, paths: &[String]) -> project_board_storage::Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("remove {}", paths.join(",")));
            self.inner.remove(paths).await
        }

        fn public_url(&self, path: &str) -> String {
            self.inner.public_url(path)
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        blobs: Arc<RecordingBlobs>,
        service: ProjectService,
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingBlobs::new(), None)
    }

    fn fixture_with(blobs: RecordingBlobs, timeout: Option<Duration>) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let blobs = Arc::new(blobs);
        let service = ProjectService::new(store.clone(), blobs.clone(), timeout);
        Fixture {
            store,
            blobs,
            service,
        }
    }

    async fn add_user(store: &MemoryStore, email: &str, role: Role) -> UserId {
        store
            .insert_user(NewUser {
                user_id: UserId::new(),
                email: email.to_string(),
                password_hash: None,
                role,
            })
            .await
            .unwrap()
            .user_id
    }

    fn input(title: &str) -> ProjectInput {
        ProjectInput {
            title: title.to_string(),
            description: None,
        }
    }

    fn upload(name: &str) -> FileUpload {
        FileUpload {
            file_name: name.to_string(),
            content_type: "application/pdf".to_string(),
            data: Bytes::from_static(b"%PDF-1.4"),
        }
    }

    #[tokio::test]
    async fn short_title_is_rejected_without_store_call() {
        let f = fixture();
        let owner = add_user(&f.store, "c@example.com", Role::Client).await;
        f.store.clear_operations();

        for title in ["", "ab", "  ab  ", "   "] {
            let err = f
                .service
                .create_or_update(input(title), owner, None)
                .await
                .expect_err("short title");
            assert_matches!(err, Error::Validation { field: "title", .. });
        }

        assert!(f.store.operations().is_empty());
    }

    #[tokio::test]
    async fn create_then_update_returns_same_id() {
        let f = fixture();
        let owner = add_user(&f.store, "c@example.com", Role::Client).await;

        let id = f
            .service
            .create_or_update(
                ProjectInput {
                    title: "  Website Redesign ".to_string(),
                    description: Some(String::new()),
                },
                owner,
                None,
            )
            .await
            .unwrap();
        let project = f.service.get_project(id).await.unwrap().unwrap();
        assert_eq!(project.title, "Website Redesign");
        assert_eq!(project.description, None);

        let updated = f
            .service
            .create_or_update(
                ProjectInput {
                    title: "Website Refresh".to_string(),
                    description: Some("New copy".to_string()),
                },
                owner,
                Some(id),
            )
            .await
            .unwrap();
        assert_eq!(updated, id);

        let project = f.service.get_project(id).await.unwrap().unwrap();
        assert_eq!(project.title, "Website Refresh");
        assert_eq!(project.description.as_deref(), Some("New copy"));

        let missing = f
            .service
            .create_or_update(input("Whatever"), owner, Some(ProjectId::new()))
            .await
            .expect_err("updating a missing project");
        assert_matches!(missing, Error::ObjectNotFound("project"));
    }

    #[tokio::test]
    async fn visibility_by_role() {
        let f = fixture();
        let u1 = add_user(&f.store, "u1@example.com", Role::Client).await;
        let u2 = add_user(&f.store, "u2@example.com", Role::Client).await;
        let manager = add_user(&f.store, "m@example.com", Role::Manager).await;
        let designer = add_user(&f.store, "d@example.com", Role::Designer).await;

        let p = f
            .service
            .create_or_update(input("Website Redesign"), u1, None)
            .await
            .unwrap();
        f.service
            .create_or_update(input("Someone else's"), u2, None)
            .await
            .unwrap();

        let ids = |list: Vec<ProjectDetails>| {
            list.into_iter()
                .map(|d| d.project.project_id)
                .collect::<Vec<_>>()
        };

        let mine = f.service.list_projects(Role::Client, u1).await.unwrap();
        assert!(mine.iter().all(|d| d.project.owner_id == u1));
        assert_eq!(ids(mine), vec![p]);

        let u2_list = ids(f.service.list_projects(Role::Client, u2).await.unwrap());
        assert!(!u2_list.contains(&p));

        let all = ids(f.service.list_projects(Role::Manager, manager).await.unwrap());
        assert_eq!(all.len(), 2);
        assert!(all.contains(&p));

        assert!(f
            .service
            .list_projects(Role::Designer, designer)
            .await
            .unwrap()
            .is_empty());
        f.service.assign(p, designer).await.unwrap();
        assert_eq!(
            ids(f.service.list_projects(Role::Designer, designer).await.unwrap()),
            vec![p]
        );
    }

    #[tokio::test]
    async fn assign_twice_conflicts_then_unassign() {
        let f = fixture();
        let owner = add_user(&f.store, "c@example.com", Role::Client).await;
        let designer = add_user(&f.store, "d@example.com", Role::Designer).await;
        let p = f
            .service
            .create_or_update(input("Logo"), owner, None)
            .await
            .unwrap();

        f.service.assign(p, designer).await.unwrap();
        let err = f
            .service
            .assign(p, designer)
            .await
            .expect_err("second assign");
        assert_matches!(err, Error::Conflict(_));

        let map = f.service.assigned_designers().await.unwrap();
        assert_eq!(map[&p].len(), 1);
        assert_eq!(map[&p][0].email, "d@example.com");

        f.service.unassign(p, designer).await.unwrap();
        let map = f.service.assigned_designers().await.unwrap();
        assert!(!map.get(&p).map(|d| !d.is_empty()).unwrap_or(false));

        // Unassigning again is a no-op.
        f.service.unassign(p, designer).await.unwrap();

        let err = f.service.assign(p, owner).await.expect_err("assign a client");
        assert_matches!(err, Error::MissingReference(_));
    }

    #[tokio::test]
    async fn empty_search_makes_no_store_call() {
        let f = fixture();
        add_user(&f.store, "ada@studio.test", Role::Designer).await;
        f.store.clear_operations();

        assert!(f.service.search_designers_by_email("").await.unwrap().is_empty());
        assert!(f
            .service
            .search_designers_by_email("   ")
            .await
            .unwrap()
            .is_empty());
        assert!(f.store.operations().is_empty());

        let found = f.service.search_designers_by_email(" ADA ").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(f.store.operations(), vec!["search_designers"]);
    }

    #[tokio::test]
    async fn search_is_limited_to_five() {
        let f = fixture();
        for i in 0..8 {
            add_user(&f.store, &format!("designer{i}@studio.test"), Role::Designer).await;
        }

        let found = f.service.search_designers_by_email("studio").await.unwrap();
        assert_eq!(found.len(), DESIGNER_SEARCH_LIMIT);
    }

    #[tokio::test]
    async fn attach_and_replace_files() {
        let f = fixture();
        let owner = add_user(&f.store, "c@example.com", Role::Client).await;
        let p = f
            .service
            .create_or_update(input("Brochure"), owner, None)
            .await
            .unwrap();

        let attached = f
            .service
            .attach_files(p, vec![upload("brief.PDF"), upload("notes")])
            .await
            .unwrap();
        assert_eq!(attached.len(), 2);
        assert!(attached[0].file_url.starts_with(&format!("projects/{p}/")));
        assert!(attached[0].file_url.ends_with(".pdf"));
        assert_ne!(attached[0].file_url, attached[1].file_url);

        let old_paths = attached
            .iter()
            .map(|f| f.file_url.clone())
            .collect::<Vec<_>>();
        let replaced = f
            .service
            .replace_files(p, &old_paths, vec![upload("final.pdf")])
            .await
            .unwrap();
        assert_eq!(replaced.len(), 1);

        let details = f.service.list_projects(Role::Client, owner).await.unwrap();
        assert_eq!(details[0].files.len(), 1);
        assert_eq!(details[0].files[0].file.file_name, "final.pdf");
        assert_eq!(
            details[0].files[0].public_url,
            format!("https://files.test/{}", replaced[0].file_url)
        );

        let calls = f.blobs.calls();
        let remove_pos = calls
            .iter()
            .position(|c| c == &format!("remove {}", old_paths.join(",")))
            .expect("old paths removed");
        let new_upload_pos = calls
            .iter()
            .position(|c| c == &format!("upload {}", replaced[0].file_url))
            .expect("new file uploaded");
        assert!(remove_pos < new_upload_pos);
    }

    #[tokio::test]
    async fn replace_rejects_foreign_paths() {
        let f = fixture();
        let owner = add_user(&f.store, "c@example.com", Role::Client).await;
        let p = f
            .service
            .create_or_update(input("Brochure"), owner, None)
            .await
            .unwrap();

        let foreign = format!("projects/{}/x.pdf", ProjectId::new());
        let err = f
            .service
            .replace_files(p, &[foreign], vec![])
            .await
            .expect_err("foreign path");
        assert_matches!(err, Error::Validation { field: "files", .. });
        assert!(f.blobs.calls().is_empty());
    }

    #[tokio::test]
    async fn rejected_replacement_keeps_current_files() {
        let f = fixture();
        let owner = add_user(&f.store, "c@example.com", Role::Client).await;
        let p = f
            .service
            .create_or_update(input("Brochure"), owner, None)
            .await
            .unwrap();
        let attached = f
            .service
            .attach_files(p, vec![upload("a.pdf"), upload("b.pdf")])
            .await
            .unwrap();
        let old_paths = attached
            .iter()
            .map(|f| f.file_url.clone())
            .collect::<Vec<_>>();
        let calls_before = f.blobs.calls();

        let big = FileUpload {
            file_name: "huge.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: Bytes::from(vec![0u8; MAX_FILE_SIZE + 1]),
        };
        let err = f
            .service
            .replace_files(p, &old_paths, vec![big])
            .await
            .expect_err("oversized replacement");
        assert_matches!(err, Error::Validation { field: "files", .. });

        let err = f
            .service
            .replace_files(ProjectId::new(), &[], vec![upload("c.pdf")])
            .await
            .expect_err("missing project");
        assert_matches!(err, Error::ObjectNotFound("project"));

        assert_eq!(f.blobs.calls(), calls_before, "no blob removed or uploaded");
        let details = f.service.project_details(p).await.unwrap().unwrap();
        assert_eq!(details.files.len(), 2);
        for path in &old_paths {
            assert!(f.blobs.inner.exists(path).await.unwrap());
        }
    }

    #[tokio::test]
    async fn attach_validation() {
        let f = fixture();
        let owner = add_user(&f.store, "c@example.com", Role::Client).await;
        let p = f
            .service
            .create_or_update(input("Poster"), owner, None)
            .await
            .unwrap();

        assert!(f.service.attach_files(p, vec![]).await.unwrap().is_empty());

        let big = FileUpload {
            file_name: "huge.mov".to_string(),
            content_type: "video/quicktime".to_string(),
            data: Bytes::from(vec![0u8; MAX_FILE_SIZE + 1]),
        };
        let err = f
            .service
            .attach_files(p, vec![upload("ok.pdf"), big])
            .await
            .expect_err("oversized file");
        assert_matches!(err, Error::Validation { field: "files", .. });
        assert!(f.blobs.calls().is_empty(), "nothing uploaded");

        let err = f
            .service
            .attach_files(ProjectId::new(), vec![upload("a.pdf")])
            .await
            .expect_err("missing project");
        assert_matches!(err, Error::ObjectNotFound("project"));
    }

    #[tokio::test]
    async fn delete_with_blob_already_gone_from_disk() {
        let dir = temp_dir::TempDir::new().unwrap();
        let f = fixture_with(RecordingBlobs::local(dir.path()), None);
        let owner = add_user(&f.store, "c@example.com", Role::Client).await;
        let p = f
            .service
            .create_or_update(input("Signage"), owner, None)
            .await
            .unwrap();
        let files = f
            .service
            .attach_files(p, vec![upload("a.pdf"), upload("b.pdf")])
            .await
            .unwrap();

        std::fs::remove_file(dir.path().join(&files[0].file_url)).unwrap();

        f.service.delete_project(p).await.unwrap();
        assert!(f.service.get_project(p).await.unwrap().is_none());
        assert!(!dir.path().join(&files[1].file_url).exists());
    }

    #[tokio::test]
    async fn delete_cascades_in_order() {
        let f = fixture();
        let owner = add_user(&f.store, "c@example.com", Role::Client).await;
        let designer = add_user(&f.store, "d@example.com", Role::Designer).await;
        let p = f
            .service
            .create_or_update(input("Catalog"), owner, None)
            .await
            .unwrap();
        let files = f
            .service
            .attach_files(p, vec![upload("a.pdf")])
            .await
            .unwrap();
        f.service.assign(p, designer).await.unwrap();
        f.store.clear_operations();

        f.service.delete_project(p).await.unwrap();

        assert_eq!(
            f.store.operations(),
            vec![
                "get_project",
                "list_project_files",
                "delete_project_files",
                "delete_project_assignments",
                "delete_project",
            ]
        );
        assert_eq!(
            f.blobs.calls().last().unwrap(),
            &format!("remove {}", files[0].file_url)
        );
        assert!(f.service.get_project(p).await.unwrap().is_none());
        assert!(f.service.assigned_designers().await.unwrap().is_empty());

        // Deleting again is a no-op.
        f.service.delete_project(p).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn slow_blob_store_times_out() {
        let mut blobs = RecordingBlobs::new();
        blobs.delay = Some(Duration::from_secs(30));
        let f = fixture_with(blobs, Some(Duration::from_secs(1)));
        let owner = add_user(&f.store, "c@example.com", Role::Client).await;
        let p = f
            .service
            .create_or_update(input("Slow upload"), owner, None)
            .await
            .unwrap();

        let err = f
            .service
            .attach_files(p, vec![upload("a.pdf")])
            .await
            .expect_err("timeout");
        assert_matches!(err, Error::Timeout);
        assert!(f.store.list_project_files(&[p]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_record_removes_uploaded_blob() {
        let f = fixture();
        let owner = add_user(&f.store, "c@example.com", Role::Client).await;
        let p = f
            .service
            .create_or_update(input("Race"), owner, None)
            .await
            .unwrap();
        let uploaded = f
            .service
            .attach_files(p, vec![upload("a.pdf")])
            .await
            .unwrap();

        // Delete the project row directly so the next metadata insert fails.
        f.store.delete_project(p).await.unwrap();
        let err = f
            .service
            .store_file(p, upload("b.pdf"))
            .await
            .expect_err("insert fails");
        assert_matches!(err, Error::MissingReference(_));

        let calls = f.blobs.calls();
        let upload_call = calls
            .iter()
            .rev()
            .find(|c| c.starts_with("upload "))
            .unwrap()
            .clone();
        let key = upload_call.trim_start_matches("upload ");
        assert_ne!(key, uploaded[0].file_url);
        assert_eq!(calls.last().unwrap(), &format!("remove {key}"));
    }
}
