use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::object_id::UserId;
#[cfg(feature = "postgres")]
use crate::schema::*;

#[cfg(feature = "postgres")]
pub use crate::schema::sessions::*;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "postgres", derive(Queryable, Identifiable, Insertable))]
#[cfg_attr(feature = "postgres", diesel(primary_key(session_id)))]
pub struct Session {
    pub session_id: Uuid,
    pub user_id: UserId,
    pub expires: DateTime<Utc>,
}
