// Forum API trait — the read/write seam reconcilers depend on.
//
// Mirrors the ForumClient surface one-to-one. Tests implement it with an
// in-memory fake that records every mutation, which is how the "second
// pass issues zero mutations" properties are checked.

use std::collections::HashMap;

use async_trait::async_trait;

use super::client::{ApiCredentials, ForumClient};
use super::{categories::Category, groups::Group, users::PendingUser, users::UserDetail};
use crate::error::ApiError;

#[async_trait]
pub trait ForumApi: Send + Sync {
    // --- Groups ---
    async fn find_group(&self, name: &str) -> Result<Option<Group>, ApiError>;
    async fn create_group(&self, name: &str, title: &str) -> Result<Group, ApiError>;
    async fn update_group_title(&self, group_id: i64, title: &str) -> Result<(), ApiError>;
    async fn delete_group(&self, group_id: i64) -> Result<(), ApiError>;

    // --- Categories ---
    async fn find_category(&self, name: &str) -> Result<Option<Category>, ApiError>;
    async fn create_category(
        &self,
        name: &str,
        color: &str,
        text_color: &str,
        permissions: &HashMap<String, i64>,
    ) -> Result<Category, ApiError>;
    async fn delete_category(&self, category_id: i64) -> Result<(), ApiError>;

    // --- Topics and replies ---
    async fn create_topic(
        &self,
        category_id: i64,
        title: &str,
        body: &str,
        creds: Option<&ApiCredentials>,
    ) -> Result<i64, ApiError>;
    async fn create_reply(
        &self,
        topic_id: i64,
        body: &str,
        creds: Option<&ApiCredentials>,
    ) -> Result<i64, ApiError>;
    async fn delete_topic(&self, topic_id: i64) -> Result<(), ApiError>;

    // --- Users ---
    async fn pending_users(&self) -> Result<Vec<PendingUser>, ApiError>;
    async fn user(&self, user_id: i64) -> Result<UserDetail, ApiError>;
    async fn add_group_member(&self, group_id: i64, username: &str) -> Result<(), ApiError>;
    async fn approve_user(&self, user_id: i64) -> Result<(), ApiError>;
    async fn activate_user(&self, user_id: i64) -> Result<(), ApiError>;
}

#[async_trait]
impl ForumApi for ForumClient {
    async fn find_group(&self, name: &str) -> Result<Option<Group>, ApiError> {
        ForumClient::find_group(self, name).await
    }

    async fn create_group(&self, name: &str, title: &str) -> Result<Group, ApiError> {
        ForumClient::create_group(self, name, title).await
    }

    async fn update_group_title(&self, group_id: i64, title: &str) -> Result<(), ApiError> {
        ForumClient::update_group_title(self, group_id, title).await
    }

    async fn delete_group(&self, group_id: i64) -> Result<(), ApiError> {
        ForumClient::delete_group(self, group_id).await
    }

    async fn find_category(&self, name: &str) -> Result<Option<Category>, ApiError> {
        ForumClient::find_category(self, name).await
    }

    async fn create_category(
        &self,
        name: &str,
        color: &str,
        text_color: &str,
        permissions: &HashMap<String, i64>,
    ) -> Result<Category, ApiError> {
        ForumClient::create_category(self, name, color, text_color, permissions).await
    }

    async fn delete_category(&self, category_id: i64) -> Result<(), ApiError> {
        ForumClient::delete_category(self, category_id).await
    }

    async fn create_topic(
        &self,
        category_id: i64,
        title: &str,
        body: &str,
        creds: Option<&ApiCredentials>,
    ) -> Result<i64, ApiError> {
        ForumClient::create_topic(self, category_id, title, body, creds).await
    }

    async fn create_reply(
        &self,
        topic_id: i64,
        body: &str,
        creds: Option<&ApiCredentials>,
    ) -> Result<i64, ApiError> {
        ForumClient::create_reply(self, topic_id, body, creds).await
    }

    async fn delete_topic(&self, topic_id: i64) -> Result<(), ApiError> {
        ForumClient::delete_topic(self, topic_id).await
    }

    async fn pending_users(&self) -> Result<Vec<PendingUser>, ApiError> {
        ForumClient::pending_users(self).await
    }

    async fn user(&self, user_id: i64) -> Result<UserDetail, ApiError> {
        ForumClient::user(self, user_id).await
    }

    async fn add_group_member(&self, group_id: i64, username: &str) -> Result<(), ApiError> {
        ForumClient::add_group_member(self, group_id, username).await
    }

    async fn approve_user(&self, user_id: i64) -> Result<(), ApiError> {
        ForumClient::approve_user(self, user_id).await
    }

    async fn activate_user(&self, user_id: i64) -> Result<(), ApiError> {
        ForumClient::activate_user(self, user_id).await
    }
}
