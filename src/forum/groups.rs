// Forum group CRUD.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::client::{Empty, ForumClient};
use crate::error::ApiError;

/// A forum group.
#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

// The group lookup response is wrapped in a "basic_group" envelope.
#[derive(Deserialize)]
struct GroupEnvelope {
    basic_group: Group,
}

#[derive(Serialize)]
struct GroupPayload<'a> {
    group: GroupFields<'a>,
}

#[derive(Serialize)]
struct GroupFields<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_group: Option<bool>,
}

impl ForumClient {
    /// Look up a group by name. `None` when the forum doesn't know it.
    pub async fn find_group(&self, name: &str) -> Result<Option<Group>, ApiError> {
        let result: Result<GroupEnvelope, ApiError> = self
            .request::<Empty, _>(Method::GET, &format!("/groups/{name}.json"), None, None)
            .await;

        match result {
            Ok(envelope) => Ok(Some(envelope.basic_group)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create a group and return it. `title` is the display title shown on
    /// member profiles (the team's display name).
    pub async fn create_group(&self, name: &str, title: &str) -> Result<Group, ApiError> {
        let payload = GroupPayload {
            group: GroupFields {
                name: Some(name),
                title: Some(title),
                primary_group: Some(true),
            },
        };

        let envelope: GroupEnvelope = self
            .request(Method::POST, "/admin/groups.json", Some(&payload), None)
            .await?;
        Ok(envelope.basic_group)
    }

    /// Update a group's display title. The group name never changes —
    /// it is the team's forum tag, which renames don't touch.
    pub async fn update_group_title(&self, group_id: i64, title: &str) -> Result<(), ApiError> {
        let payload = GroupPayload {
            group: GroupFields {
                name: None,
                title: Some(title),
                primary_group: None,
            },
        };

        self.execute(Method::PUT, &format!("/groups/{group_id}.json"), Some(&payload))
            .await
    }

    pub async fn delete_group(&self, group_id: i64) -> Result<(), ApiError> {
        self.execute::<Empty>(Method::DELETE, &format!("/admin/groups/{group_id}.json"), None)
            .await
    }
}
