// Scoring API trait — the read seam reconcilers depend on.
//
// The HTTP client implements it for production; tests substitute an
// in-memory fake. The event stream stays on the concrete client — only
// the daemon consumes it, and it is inherently tied to the transport.

use async_trait::async_trait;

use super::client::{ScoreEntry, ScoringClient, Team};
use crate::error::ApiError;

#[async_trait]
pub trait ScoringApi: Send + Sync {
    /// Full team roster, in roster order (IP resolution depends on it).
    async fn teams(&self) -> Result<Vec<Team>, ApiError>;

    /// Every score entry; folded into the pass snapshots by the caller.
    async fn scores(&self) -> Result<Vec<ScoreEntry>, ApiError>;
}

#[async_trait]
impl ScoringApi for ScoringClient {
    async fn teams(&self) -> Result<Vec<Team>, ApiError> {
        ScoringClient::teams(self).await
    }

    async fn scores(&self) -> Result<Vec<ScoreEntry>, ApiError> {
        ScoringClient::scores(self).await
    }
}
