// Scoring engine client — authenticated reads over HTTP.
//
// A thin reqwest wrapper with a generic GET helper. Every endpoint returns
// a decoded, typed result or an ApiError; nothing here retries or caches —
// reconcilers re-fetch at the start of every pass.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;

/// Read-only client for the scoring engine admin API.
#[derive(Clone)]
pub struct ScoringClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ScoringClient {
    /// Create a new client pointing at the given base URL.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("herald/0.1")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Make a GET request to an API path and deserialize the response.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}/1.0{}", self.base_url, path);

        debug!(path, "scoring GET");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(format!("{path}: {e}")))
    }

    /// Issue a raw streaming GET. Used by the event stream, which reads the
    /// response body incrementally instead of decoding it in one piece.
    pub(crate) async fn get_stream(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}/1.0{}", self.base_url, path);

        debug!(path, "scoring GET (streaming)");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(ApiError::Transport)?;

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

    /// Fetch the full team roster.
    pub async fn teams(&self) -> Result<Vec<Team>, ApiError> {
        self.get("/teams").await
    }

    /// Fetch every score entry (one row per awarded flag or adjustment).
    ///
    /// Reconcilers fold this single listing into both pass-scoped snapshots:
    /// cumulative score per team and flag-tag → teams.
    pub async fn scores(&self) -> Result<Vec<ScoreEntry>, ApiError> {
        self.get("/scores").await
    }
}

// -- Serde types for the scoring engine API --

/// A team as the scoring engine knows it.
#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    /// Comma-separated CIDR blocks the team registers from. May be empty.
    #[serde(default)]
    pub subnets: String,
    /// Free-form tags. The "forum" tag names the team's forum group(s),
    /// separated by ';' — absent or empty means no forum presence.
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl Team {
    /// The team's primary forum tag (group and category name), if any.
    pub fn forum_tag(&self) -> Option<&str> {
        self.forum_groups().into_iter().next()
    }

    /// All forum groups named by the team's tag, in declared order.
    pub fn forum_groups(&self) -> Vec<&str> {
        self.tags
            .get("forum")
            .map(|raw| {
                raw.split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One score entry: points awarded to a team, optionally tied to a flag tag.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreEntry {
    pub team_id: i64,
    /// Flag tag this entry was awarded for. Empty for manual adjustments.
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub value: i64,
}
