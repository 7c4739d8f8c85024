//! Login flow
//!
//! Two-step exchange: credentials for a token, then the token for the
//! user's profile. The session is persisted only once both steps succeed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use coop_core::session::{Session, SessionStore};

use crate::api::AuthApi;
use crate::error::{ClientError, Result};

/// Clears the in-flight flag when the exchange ends, however it ends
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct AuthFlow {
    api: Arc<dyn AuthApi>,
    sessions: SessionStore,
    submitting: AtomicBool,
}

impl AuthFlow {
    pub fn new(api: Arc<dyn AuthApi>, sessions: SessionStore) -> Self {
        Self {
            api,
            sessions,
            submitting: AtomicBool::new(false),
        }
    }

    /// Whether a login exchange is in flight
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Sign in and persist the resulting session
    ///
    /// Rejected without a network call while another login is running.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(coop_core::Error::InvalidInput(
                "username and password are required".to_string(),
            )
            .into());
        }

        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ClientError::LoginInProgress);
        }
        let _guard = SubmitGuard(&self.submitting);

        let token = self.api.login(username, password).await?;

        let user = self.api.profile(&token).await.map_err(|e| match e {
            transport @ ClientError::Transport { .. } => transport,
            other => {
                warn!("Profile fetch failed after login: {}", other);
                ClientError::Profile {
                    message: other.to_string(),
                }
            }
        })?;

        self.sessions.save(&token, &user).await?;
        info!("Signed in as {}", user.username);

        Ok(Session::new(token, user))
    }

    /// Drop the persisted session
    pub async fn logout(&self) -> Result<()> {
        self.sessions.clear().await?;
        info!("Signed out");
        Ok(())
    }
}
