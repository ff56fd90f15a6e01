use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{event, Level};
use uuid::Uuid;

/// Persistence for login sessions.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    type UserId: Send + Sync;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn add_session(
        &self,
        session_id: Uuid,
        user_id: Self::UserId,
        expires: DateTime<Utc>,
    ) -> Result<(), Self::Error>;

    /// Returns the session's user and expiration time, if it exists.
    async fn lookup_session(
        &self,
        session_id: Uuid,
    ) -> Result<Option<(Self::UserId, DateTime<Utc>)>, Self::Error>;

    async fn delete_session(&self, session_id: Uuid) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub token: String,
    pub expires: DateTime<Utc>,
}

/// Creates, resolves, and ends sessions with a fixed lifetime. Tokens are the session id.
#[derive(Debug, Clone)]
pub struct SessionManager<STORE: SessionStore> {
    pub store: STORE,
    pub lifetime: Duration,
}

impl<STORE: SessionStore> SessionManager<STORE> {
    pub fn new(store: STORE, lifetime: Duration) -> Self {
        SessionManager { store, lifetime }
    }

    pub async fn create_session(&self, user_id: STORE::UserId) -> Result<NewSession, STORE::Error> {
        let session_id = Uuid::new_v4();
        let expires = Utc::now() + self.lifetime;
        self.store.add_session(session_id, user_id, expires).await?;

        Ok(NewSession {
            token: session_id.simple().to_string(),
            expires,
        })
    }

    /// Resolve a token to its user. Malformed tokens, unknown sessions, and expired sessions
    /// all resolve to `None`; expired sessions are deleted along the way.
    pub async fn lookup(&self, token: &str) -> Result<Option<STORE::UserId>, STORE::Error> {
        let Ok(session_id) = Uuid::parse_str(token) else {
            return Ok(None);
        };

        match self.store.lookup_session(session_id).await? {
            Some((user_id, expires)) if expires > Utc::now() => Ok(Some(user_id)),
            Some(_) => {
                event!(Level::DEBUG, %session_id, "Removing expired session");
                self.store.delete_session(session_id).await?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub async fn end_session(&self, token: &str) -> Result<(), STORE::Error> {
        match Uuid::parse_str(token) {
            Ok(session_id) => self.store.delete_session(session_id).await,
            Err(_) => Ok(()),
        }
    }
}
