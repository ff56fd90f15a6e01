use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::object_id::{ProjectId, UserId};
#[cfg(feature = "postgres")]
use crate::schema::*;

#[cfg(feature = "postgres")]
pub use crate::schema::project_assignments::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(Queryable, Insertable))]
#[cfg_attr(feature = "postgres", diesel(table_name = project_assignments))]
pub struct ProjectAssignment {
    pub project_id: ProjectId,
    pub designer_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// A row of the "assignments across all projects" query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(QueryableByName))]
pub struct AssignedDesigner {
    #[cfg_attr(feature = "postgres", diesel(sql_type = diesel::sql_types::Uuid))]
    pub project_id: ProjectId,
    #[cfg_attr(feature = "postgres", diesel(sql_type = diesel::sql_types::Uuid))]
    pub designer_id: UserId,
    #[cfg_attr(feature = "postgres", diesel(sql_type = diesel::sql_types::Text))]
    pub designer_email: String,
}
