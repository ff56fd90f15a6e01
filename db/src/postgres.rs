use async_trait::async_trait;
use chrono::Utc;
use diesel::{
    prelude::*,
    sql_types::{BigInt, Text},
    Connection, PgConnection,
};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};
use tracing::{event, Level};
use uuid::Uuid;

use crate::{
    object_id::{ProjectId, UserId},
    project_assignments::{self, AssignedDesigner, ProjectAssignment},
    project_files::{self, NewProjectFile, ProjectFile},
    projects::{self, NewProject, Project, ProjectUpdate},
    schema::{roles, user_profiles},
    sessions::{self, Session},
    users::{self, Designer, NewUser, User},
    EntityStore, ProjectFilter, Role, StoreError,
};

pub type Pool = deadpool_diesel::postgres::Pool;

sql_function! {
    fn lower(x: Text) -> Text;
}

pub const MIGRATIONS: EmbeddedMigrations = diesel_migrations::embed_migrations!();

pub fn connect(conn_str: &str, max_connections: usize) -> Result<Pool, impl std::error::Error> {
    let manager =
        deadpool_diesel::postgres::Manager::new(conn_str, deadpool_diesel::Runtime::Tokio1);
    deadpool_diesel::postgres::Pool::builder(manager)
        .max_size(max_connections)
        .build()
}

#[async_trait]
pub trait PoolExt<F, RETVAL>
where
    F: (FnOnce(&mut PgConnection) -> Result<RETVAL, StoreError>) + Send + 'static,
    RETVAL: Send + 'static,
{
    async fn interact(&self, f: F) -> Result<RETVAL, StoreError>;
    async fn transaction(&self, f: F) -> Result<RETVAL, StoreError>;
}

#[async_trait]
impl<F, RETVAL> PoolExt<F, RETVAL> for Pool
where
    F: (FnOnce(&mut PgConnection) -> Result<RETVAL, StoreError>) + Send + 'static,
    RETVAL: Send + 'static,
{
    async fn interact(&self, f: F) -> Result<RETVAL, StoreError> {
        let conn = self.get().await?;
        conn.interact(move |conn| f(conn)).await?
    }

    async fn transaction(&self, f: F) -> Result<RETVAL, StoreError> {
        let conn = self.get().await?;
        conn.interact(move |conn| conn.transaction(move |conn| f(conn)))
            .await?
    }
}

/// An [EntityStore] backed by Postgres.
#[derive(Clone)]
pub struct PgStore {
    pub pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        PgStore { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        self.pool
            .interact(|conn| {
                let applied = conn
                    .run_pending_migrations(MIGRATIONS)
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;
                for migration in applied {
                    event!(Level::INFO, %migration, "Applied migration");
                }
                Ok(())
            })
            .await
    }
}

type UserRow = (UserId, String, Option<String>, String, chrono::DateTime<Utc>);

fn user_from_row(row: UserRow) -> Result<User, StoreError> {
    let (user_id, email, password_hash, role, created) = row;
    let role = role
        .parse::<Role>()
        .map_err(|e| StoreError::InvalidData(e.to_string()))?;
    Ok(User {
        user_id,
        email,
        role,
        password_hash,
        created,
    })
}

macro_rules! user_query {
    () => {
        users::table
            .inner_join(user_profiles::table.inner_join(roles::table))
            .select((
                users::user_id,
                users::email,
                users::password_hash,
                roles::name,
                users::created,
            ))
    };
}

/// Escape the LIKE wildcards in a user-supplied fragment.
fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', r"\\")
        .replace('%', r"\%")
        .replace('_', r"\_");
    format!("%{escaped}%")
}

#[async_trait]
impl EntityStore for PgStore {
    async fn list_projects(&self, filter: ProjectFilter) -> Result<Vec<Project>, StoreError> {
        self.pool
            .interact(move |conn| {
                let q = projects::table
                    .order(projects::created_at.desc())
                    .into_boxed();

                let q = match filter {
                    ProjectFilter::All => q,
                    ProjectFilter::OwnedBy(owner) => q.filter(projects::owner_id.eq(owner)),
                    ProjectFilter::AssignedTo(designer) => q.filter(
                        projects::project_id.eq_any(
                            project_assignments::table
                                .filter(project_assignments::designer_id.eq(designer))
                                .select(project_assignments::project_id),
                        ),
                    ),
                };

                q.load::<Project>(conn).map_err(StoreError::from)
            })
            .await
    }

    async fn get_project(&self, project_id: ProjectId) -> Result<Option<Project>, StoreError> {
        self.pool
            .interact(move |conn| {
                projects::table
                    .find(project_id)
                    .first::<Project>(conn)
                    .optional()
                    .map_err(StoreError::from)
            })
            .await
    }

    async fn insert_project(&self, project: NewProject) -> Result<Project, StoreError> {
        self.pool
            .interact(move |conn| {
                diesel::insert_into(projects::table)
                    .values(&project)
                    .get_result::<Project>(conn)
                    .map_err(StoreError::from)
            })
            .await
    }

    async fn update_project(
        &self,
        project_id: ProjectId,
        update: ProjectUpdate,
    ) -> Result<Option<Project>, StoreError> {
        self.pool
            .interact(move |conn| {
                diesel::update(projects::table.find(project_id))
                    .set(&update)
                    .get_result::<Project>(conn)
                    .optional()
                    .map_err(StoreError::from)
            })
            .await
    }

    async fn delete_project(&self, project_id: ProjectId) -> Result<usize, StoreError> {
        self.pool
            .interact(move |conn| {
                diesel::delete(projects::table.find(project_id))
                    .execute(conn)
                    .map_err(StoreError::from)
            })
            .await
    }

    async fn list_project_files(
        &self,
        project_ids: &[ProjectId],
    ) -> Result<Vec<ProjectFile>, StoreError> {
        let project_ids = project_ids.to_vec();
        self.pool
            .interact(move |conn| {
                project_files::table
                    .filter(project_files::project_id.eq_any(project_ids))
                    .order(project_files::created_at.asc())
                    .load::<ProjectFile>(conn)
                    .map_err(StoreError::from)
            })
            .await
    }

    async fn insert_project_file(&self, file: NewProjectFile) -> Result<ProjectFile, StoreError> {
        self.pool
            .interact(move |conn| {
                diesel::insert_into(project_files::table)
                    .values(&file)
                    .get_result::<ProjectFile>(conn)
                    .map_err(StoreError::from)
            })
            .await
    }

    async fn delete_project_files(&self, project_id: ProjectId) -> Result<usize, StoreError> {
        self.pool
            .interact(move |conn| {
                diesel::delete(
                    project_files::table.filter(project_files::project_id.eq(project_id)),
                )
                .execute(conn)
                .map_err(StoreError::from)
            })
            .await
    }

    async fn insert_assignment(
        &self,
        project_id: ProjectId,
        designer_id: UserId,
    ) -> Result<ProjectAssignment, StoreError> {
        self.pool
            .transaction(move |conn| {
                let is_designer = user_profiles::table
                    .inner_join(roles::table)
                    .filter(user_profiles::user_id.eq(designer_id))
                    .filter(roles::name.eq(Role::Designer.as_str()))
                    .count()
                    .get_result::<i64>(conn)?
                    > 0;

                if !is_designer {
                    return Err(StoreError::MissingReference("designer".to_string()));
                }

                let row = ProjectAssignment {
                    project_id,
                    designer_id,
                    created_at: Utc::now(),
                };

                diesel::insert_into(project_assignments::table)
                    .values(&row)
                    .get_result::<ProjectAssignment>(conn)
                    .map_err(StoreError::from)
            })
            .await
    }

    async fn delete_assignment(
        &self,
        project_id: ProjectId,
        designer_id: UserId,
    ) -> Result<usize, StoreError> {
        self.pool
            .interact(move |conn| {
                diesel::delete(project_assignments::table.find((project_id, designer_id)))
                    .execute(conn)
                    .map_err(StoreError::from)
            })
            .await
    }

    async fn delete_project_assignments(
        &self,
        project_id: ProjectId,
    ) -> Result<usize, StoreError> {
        self.pool
            .interact(move |conn| {
                diesel::delete(
                    project_assignments::table
                        .filter(project_assignments::project_id.eq(project_id)),
                )
                .execute(conn)
                .map_err(StoreError::from)
            })
            .await
    }

    async fn list_assignments(&self) -> Result<Vec<AssignedDesigner>, StoreError> {
        self.pool
            .interact(|conn| {
                diesel::sql_query(
                    "SELECT project_id, designer_id, designer_email FROM get_project_assignments()",
                )
                .load::<AssignedDesigner>(conn)
                .map_err(StoreError::from)
            })
            .await
    }

    async fn search_designers(
        &self,
        fragment: &str,
        limit: usize,
    ) -> Result<Vec<Designer>, StoreError> {
        let pattern = like_pattern(fragment);
        let limit = limit as i64;
        self.pool
            .interact(move |conn| {
                diesel::sql_query("SELECT id, email FROM search_designers_by_email($1) LIMIT $2")
                    .bind::<Text, _>(pattern)
                    .bind::<BigInt, _>(limit)
                    .load::<Designer>(conn)
                    .map_err(StoreError::from)
            })
            .await
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.pool
            .transaction(move |conn| {
                let role_id = roles::table
                    .filter(roles::name.eq(user.role.as_str()))
                    .select(roles::role_id)
                    .first::<i32>(conn)
                    .optional()?
                    .ok_or_else(|| StoreError::MissingReference("role".to_string()))?;

                diesel::insert_into(users::table)
                    .values((
                        users::user_id.eq(user.user_id),
                        users::email.eq(&user.email),
                        users::password_hash.eq(&user.password_hash),
                    ))
                    .execute(conn)?;

                diesel::insert_into(user_profiles::table)
                    .values((
                        user_profiles::user_id.eq(user.user_id),
                        user_profiles::role_id.eq(role_id),
                    ))
                    .execute(conn)?;

                let row = user_query!()
                    .filter(users::user_id.eq(user.user_id))
                    .first::<UserRow>(conn)?;
                user_from_row(row)
            })
            .await
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        self.pool
            .interact(move |conn| {
                user_query!()
                    .filter(users::user_id.eq(user_id))
                    .first::<UserRow>(conn)
                    .optional()?
                    .map(user_from_row)
                    .transpose()
            })
            .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = email.to_lowercase();
        self.pool
            .interact(move |conn| {
                user_query!()
                    .filter(lower(users::email).eq(email))
                    .first::<UserRow>(conn)
                    .optional()?
                    .map(user_from_row)
                    .transpose()
            })
            .await
    }

    async fn insert_session(&self, session: Session) -> Result<(), StoreError> {
        self.pool
            .interact(move |conn| {
                diesel::insert_into(sessions::table)
                    .values(&session)
                    .execute(conn)?;
                Ok(())
            })
            .await
    }

    async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>, StoreError> {
        self.pool
            .interact(move |conn| {
                sessions::table
                    .find(session_id)
                    .first::<Session>(conn)
                    .optional()
                    .map_err(StoreError::from)
            })
            .await
    }

    async fn delete_session(&self, session_id: Uuid) -> Result<usize, StoreError> {
        self.pool
            .interact(move |conn| {
                diesel::delete(sessions::table.find(session_id))
                    .execute(conn)
                    .map_err(StoreError::from)
            })
            .await
    }
}
