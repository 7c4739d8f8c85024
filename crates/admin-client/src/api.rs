//! REST API client
//!
//! Talks to the cooperative backend under `/api/v1`. Authenticated calls
//! read the bearer token from the session store on every request, so a
//! token replaced elsewhere is used on the next call.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use coop_core::associate::{Associate, AssociateList, AssociatePayload, ListQuery};
use coop_core::session::{SessionStore, UserProfile};

use crate::config::ClientConfig;
use crate::error::{extract_detail, ClientError, Result};

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Credential exchange and profile lookup
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for an access token
    async fn login(&self, username: &str, password: &str) -> Result<String>;

    /// Fetch the profile of the token's owner
    async fn profile(&self, token: &str) -> Result<UserProfile>;
}

/// CRUD operations on the associate collection
#[async_trait]
pub trait AssociatesApi: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Associate>>;

    async fn get(&self, id: i64) -> Result<Associate>;

    async fn create(&self, payload: &AssociatePayload) -> Result<Associate>;

    async fn update(&self, id: i64, payload: &AssociatePayload) -> Result<Associate>;

    async fn delete(&self, id: i64) -> Result<()>;
}

/// HTTP client for the cooperative backend
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    sessions: SessionStore,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, sessions: SessionStore) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base(),
            sessions,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the stored token, send, and reject non-success responses
    async fn send_authed(&self, request: RequestBuilder) -> Result<Response> {
        let token = self
            .sessions
            .token()
            .await?
            .ok_or(ClientError::NotAuthenticated)?;

        let response = request.bearer_auth(token).send().await?;
        self.check(response).await
    }

    async fn check(&self, response: Response) -> Result<Response> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("Backend rejected the stored token, clearing session");
            self.sessions.clear().await?;
            return Err(ClientError::SessionExpired);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = extract_detail(&body);
            debug!("Request failed with HTTP {}: {:?}", status, detail);
            return Err(ClientError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<String> {
        info!("Signing in as {}", username);

        let response = self
            .client
            .post(self.url("/auth/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| ClientError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                "Login rejected with HTTP {}: {}",
                status,
                extract_detail(&body).unwrap_or_default()
            );
            return Err(ClientError::InvalidCredentials);
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn profile(&self, token: &str) -> Result<UserProfile> {
        let response = self
            .client
            .get(self.url("/auth/me"))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                detail: extract_detail(&body),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl AssociatesApi for ApiClient {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Associate>> {
        let mut request = self.client.get(self.url("/asociados"));
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = self.send_authed(request).await?;
        let list: AssociateList = response.json().await?;
        let items = list.into_vec();
        debug!("Fetched {} associates", items.len());
        Ok(items)
    }

    async fn get(&self, id: i64) -> Result<Associate> {
        let request = self.client.get(self.url(&format!("/asociados/{}", id)));
        let response = self.send_authed(request).await?;
        Ok(response.json().await?)
    }

    async fn create(&self, payload: &AssociatePayload) -> Result<Associate> {
        let request = self.client.post(self.url("/asociados")).json(payload);
        let response = self.send_authed(request).await?;
        let created: Associate = response.json().await?;
        info!("Created associate {}", created.id);
        Ok(created)
    }

    async fn update(&self, id: i64, payload: &AssociatePayload) -> Result<Associate> {
        let request = self
            .client
            .put(self.url(&format!("/asociados/{}", id)))
            .json(payload);
        let response = self.send_authed(request).await?;
        info!("Updated associate {}", id);
        Ok(response.json().await?)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let request = self.client.delete(self.url(&format!("/asociados/{}", id)));
        self.send_authed(request).await?;
        info!("Deleted associate {}", id);
        Ok(())
    }
}
