use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::object_id::{ProjectFileId, ProjectId};
#[cfg(feature = "postgres")]
use crate::schema::*;

#[cfg(feature = "postgres")]
pub use crate::schema::project_files::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(Queryable, Identifiable))]
#[cfg_attr(feature = "postgres", diesel(primary_key(project_file_id)))]
pub struct ProjectFile {
    #[serde(rename = "id")]
    pub project_file_id: ProjectFileId,
    pub project_id: ProjectId,
    /// The name of the file as uploaded.
    pub file_name: String,
    /// The storage key of the blob. This is not a URL; resolve it through the blob store.
    pub file_url: String,
    pub file_size: i64,
    pub file_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "postgres", derive(Insertable))]
#[cfg_attr(feature = "postgres", diesel(table_name = project_files))]
pub struct NewProjectFile {
    pub project_file_id: ProjectFileId,
    pub project_id: ProjectId,
    pub file_name: String,
    pub file_url: String,
    pub file_size: i64,
    pub file_type: String,
    pub created_at: DateTime<Utc>,
}
