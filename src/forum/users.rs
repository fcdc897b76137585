// User administration: pending-user listing, detail fetch, group
// membership, approval, activation.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::client::{Empty, ForumClient};
use crate::error::ApiError;

/// A user from the pending-approval queue.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub can_approve: bool,
}

/// The full admin record for one user. Only the detail endpoint includes
/// the registration IP, which is what ties a user to a team.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDetail {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub registration_ip_address: String,
}

#[derive(Serialize)]
struct MemberPayload<'a> {
    usernames: &'a str,
}

impl ForumClient {
    /// List users waiting for approval.
    pub async fn pending_users(&self) -> Result<Vec<PendingUser>, ApiError> {
        self.request::<Empty, _>(Method::GET, "/admin/users/list/pending.json", None, None)
            .await
    }

    /// Fetch one user's full record (including registration IP).
    pub async fn user(&self, user_id: i64) -> Result<UserDetail, ApiError> {
        self.request::<Empty, _>(Method::GET, &format!("/admin/users/{user_id}.json"), None, None)
            .await
    }

    /// Add a user to a group.
    pub async fn add_group_member(&self, group_id: i64, username: &str) -> Result<(), ApiError> {
        let payload = MemberPayload { usernames: username };
        self.execute(
            Method::PUT,
            &format!("/groups/{group_id}/members.json"),
            Some(&payload),
        )
        .await
    }

    pub async fn approve_user(&self, user_id: i64) -> Result<(), ApiError> {
        self.execute::<Empty>(Method::PUT, &format!("/admin/users/{user_id}/approve"), None)
            .await
    }

    /// Activate without the e-mail round trip — accounts are IP-verified.
    pub async fn activate_user(&self, user_id: i64) -> Result<(), ApiError> {
        self.execute::<Empty>(Method::PUT, &format!("/admin/users/{user_id}/activate"), None)
            .await
    }
}
