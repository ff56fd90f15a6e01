use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{object_id::UserId, Role};

#[cfg(feature = "postgres")]
pub use crate::schema::users::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub password_hash: Option<String>,
    pub created: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub user_id: UserId,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: Role,
}

/// A user with the designer role, as returned by the designer search.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(QueryableByName))]
pub struct Designer {
    #[cfg_attr(feature = "postgres", diesel(sql_type = diesel::sql_types::Uuid))]
    pub id: UserId,
    #[cfg_attr(feature = "postgres", diesel(sql_type = diesel::sql_types::Text))]
    pub email: String,
}
