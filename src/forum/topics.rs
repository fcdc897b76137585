// Topic and reply creation, topic deletion.
//
// Both creation calls accept optional authoring credentials so a post
// definition can publish as a different forum user.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::client::{ApiCredentials, Empty, ForumClient};
use crate::error::ApiError;

#[derive(Serialize)]
struct NewTopicPayload<'a> {
    title: &'a str,
    raw: &'a str,
    category: i64,
}

#[derive(Serialize)]
struct NewReplyPayload<'a> {
    topic_id: i64,
    raw: &'a str,
}

/// Response to creating a topic or a reply.
#[derive(Deserialize)]
struct NewPostResponse {
    id: i64,
    topic_id: i64,
}

impl ForumClient {
    /// Create a topic in a category and return the new topic's id.
    pub async fn create_topic(
        &self,
        category_id: i64,
        title: &str,
        body: &str,
        creds: Option<&ApiCredentials>,
    ) -> Result<i64, ApiError> {
        let payload = NewTopicPayload {
            title,
            raw: body,
            category: category_id,
        };

        let response: NewPostResponse = self
            .request(Method::POST, "/posts.json", Some(&payload), creds)
            .await?;
        Ok(response.topic_id)
    }

    /// Create a reply in an existing topic and return the new post's id.
    pub async fn create_reply(
        &self,
        topic_id: i64,
        body: &str,
        creds: Option<&ApiCredentials>,
    ) -> Result<i64, ApiError> {
        let payload = NewReplyPayload { topic_id, raw: body };

        let response: NewPostResponse = self
            .request(Method::POST, "/posts.json", Some(&payload), creds)
            .await?;
        Ok(response.id)
    }

    /// Delete a topic and everything under it.
    pub async fn delete_topic(&self, topic_id: i64) -> Result<(), ApiError> {
        self.execute::<Empty>(Method::DELETE, &format!("/t/{topic_id}.json"), None)
            .await
    }
}
