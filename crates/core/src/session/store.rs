//! Session persistence
//!
//! Keeps the access token and the user profile in two string entries,
//! `token` and `user` (JSON), so a session survives restarts.

use std::sync::Arc;
use tracing::{debug, warn};

use super::kv::KeyValueStore;
use super::model::{Session, UserProfile};
use crate::Result;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Session store over a key-value backend
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Load the persisted session
    ///
    /// Returns `None` when either entry is missing. A `user` entry that is
    /// not a valid profile clears both entries.
    pub async fn load(&self) -> Result<Option<Session>> {
        let token = self.storage.get(TOKEN_KEY).await?;
        let user = self.storage.get(USER_KEY).await?;

        let (token, user) = match (token, user) {
            (Some(token), Some(user)) => (token, user),
            _ => return Ok(None),
        };

        match serde_json::from_str::<UserProfile>(&user) {
            Ok(user) => Ok(Some(Session { token, user })),
            Err(e) => {
                warn!("Discarding corrupt persisted session: {}", e);
                self.clear().await?;
                Ok(None)
            }
        }
    }

    /// Persist a session, replacing any previous one
    pub async fn save(&self, token: &str, user: &UserProfile) -> Result<()> {
        let user_json = serde_json::to_string(user)?;
        self.storage.set(TOKEN_KEY, token).await?;
        self.storage.set(USER_KEY, &user_json).await?;
        debug!("Session saved for {}", user.username);
        Ok(())
    }

    /// Remove the persisted session
    pub async fn clear(&self) -> Result<()> {
        self.storage.remove(TOKEN_KEY).await?;
        self.storage.remove(USER_KEY).await?;
        Ok(())
    }

    /// Current access token, read from storage on every call
    pub async fn token(&self) -> Result<Option<String>> {
        self.storage.get(TOKEN_KEY).await
    }
}
