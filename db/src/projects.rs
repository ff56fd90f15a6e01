use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::object_id::{ProjectId, UserId};
#[cfg(feature = "postgres")]
use crate::schema::*;

#[cfg(feature = "postgres")]
pub use crate::schema::projects::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(Queryable, Identifiable))]
#[cfg_attr(feature = "postgres", diesel(primary_key(project_id)))]
pub struct Project {
    #[serde(rename = "id")]
    pub project_id: ProjectId,
    pub owner_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "postgres", derive(Insertable))]
#[cfg_attr(feature = "postgres", diesel(table_name = projects))]
pub struct NewProject {
    pub project_id: ProjectId,
    pub owner_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl NewProject {
    pub fn new(owner_id: UserId, title: String, description: Option<String>) -> Self {
        let now = Utc::now();
        NewProject {
            project_id: ProjectId::new(),
            owner_id,
            title,
            description,
            created_at: now,
            updated: now,
        }
    }
}

/// The editable fields of a project. Ownership never changes after creation.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "postgres", derive(AsChangeset))]
#[cfg_attr(
    feature = "postgres",
    diesel(table_name = projects, treat_none_as_null = true)
)]
pub struct ProjectUpdate {
    pub title: String,
    pub description: Option<String>,
    pub updated: DateTime<Utc>,
}

impl ProjectUpdate {
    pub fn new(title: String, description: Option<String>) -> Self {
        ProjectUpdate {
            title,
            description,
            updated: Utc::now(),
        }
    }
}
