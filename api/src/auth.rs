use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, Request},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use project_board_auth as auth;
use project_board_db::{
    object_id::UserId, projects::Project, sessions::Session, users::User, EntityStore, Role,
    StoreError,
};

use crate::{shared_state::State, Error};

/// Sessions persisted in the [EntityStore].
#[derive(Clone)]
pub struct SessionStore {
    pub store: Arc<dyn EntityStore>,
}

#[async_trait]
impl auth::SessionStore for SessionStore {
    type UserId = UserId;
    type Error = StoreError;

    async fn add_session(
        &self,
        session_id: Uuid,
        user_id: UserId,
        expires: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.store
            .insert_session(Session {
                session_id,
                user_id,
                expires,
            })
            .await
    }

    async fn lookup_session(
        &self,
        session_id: Uuid,
    ) -> Result<Option<(UserId, DateTime<Utc>)>, StoreError> {
        let session = self.store.get_session(session_id).await?;
        Ok(session.map(|s| (s.user_id, s.expires)))
    }

    async fn delete_session(&self, session_id: Uuid) -> Result<(), StoreError> {
        self.store.delete_session(session_id).await?;
        Ok(())
    }
}

/// The authenticated user making a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    #[serde(rename = "id")]
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        UserInfo {
            user_id: user.user_id,
            email: user.email,
            role: user.role,
        }
    }
}

/// The bearer token of the current request, once it has been resolved to a user.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Resolve the bearer token, if any, to a user and attach it to the request.
pub async fn authenticate<B>(
    Extension(state): Extension<State>,
    mut req: Request<B>,
    next: Next<B>,
) -> Response {
    let token = match auth::extract_bearer_auth_value(req.headers()) {
        Ok(token) => token,
        Err(e) => return Error::from(e).into_response(),
    };

    if let Some(token) = token {
        match state.accounts.current_user(&token).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
                req.extensions_mut().insert(SessionToken(token));
            }
            Ok(None) => {}
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for UserInfo {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserInfo>()
            .cloned()
            .ok_or(Error::Unauthenticated)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SessionToken {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionToken>()
            .cloned()
            .ok_or(Error::Unauthenticated)
    }
}

pub fn must_have_role(user: &UserInfo, role: Role) -> Result<(), Error> {
    if user.role == role {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

/// Owners and managers can change a project and its files.
pub fn can_modify_project(user: &UserInfo, project: &Project) -> bool {
    match user.role {
        Role::Manager => true,
        Role::Client => project.owner_id == user.user_id,
        Role::Designer => false,
    }
}

pub fn must_modify_project(user: &UserInfo, project: &Project) -> Result<(), Error> {
    if can_modify_project(user, project) {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

/// Managers see everything, clients see their own projects, and designers see the
/// projects assigned to them.
pub fn can_view_project(user: &UserInfo, project: &Project, assigned: &[UserId]) -> bool {
    match user.role {
        Role::Manager => true,
        Role::Client => project.owner_id == user.user_id,
        Role::Designer => assigned.contains(&user.user_id),
    }
}
