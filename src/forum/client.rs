// Forum platform client — authenticated admin calls over HTTP.
//
// A thin reqwest wrapper with generic request helpers. Admin credentials
// ride in Api-Key/Api-Username headers; individual posts may override the
// username and key so they appear authored by another account.

use anyhow::{Context, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// Per-call authoring credentials. Post definitions may carry their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCredentials {
    pub user: String,
    pub key: String,
}

/// Admin client for the forum platform.
#[derive(Clone)]
pub struct ForumClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_user: String,
}

impl ForumClient {
    /// Create a new client pointing at the given base URL.
    pub fn new(base_url: &str, api_key: &str, api_user: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("herald/0.1")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_user: api_user.to_string(),
        })
    }

    /// Send a request and return the status-checked response.
    ///
    /// `creds` overrides the authoring identity for this one call.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        creds: Option<&ApiCredentials>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        debug!(%method, path, "forum request");

        let (user, key) = match creds {
            Some(c) => (c.user.as_str(), c.key.as_str()),
            None => (self.api_user.as_str(), self.api_key.as_str()),
        };

        let mut request = self
            .client
            .request(method, &url)
            .header("Api-Key", key)
            .header("Api-Username", user);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Request and deserialize the response body.
    pub(crate) async fn request<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        creds: Option<&ApiCredentials>,
    ) -> Result<T, ApiError> {
        let response = self.send(method, path, body, creds).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(format!("{path}: {e}")))
    }

    /// Request and discard the response body (approve, activate, deletes).
    pub(crate) async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        self.send(method, path, body, None).await?;
        Ok(())
    }
}

/// Placeholder body for calls that take none. Serializes to an empty object.
#[derive(Serialize)]
pub(crate) struct Empty {}
