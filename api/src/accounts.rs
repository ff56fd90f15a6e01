use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{event, instrument, Level};

use project_board_auth::{self as auth, SessionManager};
use project_board_db::{object_id::UserId, users::NewUser, EntityStore, Role};

use crate::{
    auth::{SessionStore, UserInfo},
    Error, Result,
};

#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    pub token: String,
    pub expires: DateTime<Utc>,
    pub user: UserInfo,
}

/// Sign-up, sign-in, and session resolution.
pub struct Accounts {
    store: Arc<dyn EntityStore>,
    sessions: SessionManager<SessionStore>,
}

impl Accounts {
    pub fn new(store: Arc<dyn EntityStore>, session_lifetime: Duration) -> Self {
        let sessions = SessionManager::new(
            SessionStore {
                store: store.clone(),
            },
            session_lifetime,
        );

        Accounts { store, sessions }
    }

    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str, role: Role) -> Result<UserInfo> {
        let email = email.trim();
        if !email.contains('@') {
            return Err(Error::validation("email", "Enter a valid email address"));
        }

        auth::check_password_strength(password).map_err(|e| Error::validation("password", e.to_string()))?;

        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || auth::new_hash(&password))
            .await
            .map_err(|e| Error::Internal(e.to_string()))??;

        let user = self
            .store
            .insert_user(NewUser {
                user_id: UserId::new(),
                email: email.to_string(),
                password_hash: Some(hash),
                role,
            })
            .await?;

        event!(Level::INFO, user_id=%user.user_id, %role, "Signed up");
        Ok(user.into())
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn> {
        let user = self
            .store
            .find_user_by_email(email.trim())
            .await?
            .ok_or(Error::InvalidCredentials)?;

        let hash = user
            .password_hash
            .clone()
            .ok_or(Error::InvalidCredentials)?;
        let password = password.to_string();
        tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
            .await
            .map_err(|e| Error::Internal(e.to_string()))?
            .map_err(|_| Error::InvalidCredentials)?;

        let session = self.sessions.create_session(user.user_id).await?;
        event!(Level::INFO, user_id=%user.user_id, "Signed in");

        Ok(SignedIn {
            token: session.token,
            expires: session.expires,
            user: user.into(),
        })
    }

    pub async fn sign_out(&self, token: &str) -> Result<()> {
        self.sessions.end_session(token).await?;
        Ok(())
    }

    /// The user a session token belongs to, if the session is still valid.
    pub async fn current_user(&self, token: &str) -> Result<Option<UserInfo>> {
        let Some(user_id) = self.sessions.lookup(token).await? else {
            return Ok(None);
        };

        let user = self.store.get_user(user_id).await?;
        Ok(user.map(UserInfo::from))
    }
}
