// Forum category CRUD.
//
// Each team gets one category, named after its forum tag, readable only by
// the groups named in the permission map. Deleting a team's category
// implicitly closes the topics under it.

use std::collections::HashMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::client::{Empty, ForumClient};
use crate::error::ApiError;

/// A forum category.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Deserialize)]
struct CategoryEnvelope {
    category: Category,
}

#[derive(Deserialize)]
struct CategoryListEnvelope {
    category_list: CategoryList,
}

#[derive(Deserialize)]
struct CategoryList {
    categories: Vec<Category>,
}

#[derive(Serialize)]
struct CategoryPayload<'a> {
    name: &'a str,
    color: &'a str,
    text_color: &'a str,
    /// Group name → access level. Level 1 grants full access.
    permissions: &'a HashMap<String, i64>,
}

impl ForumClient {
    /// Look up a category by name. `None` when no category matches.
    ///
    /// The platform has no by-name endpoint, so this lists and scans —
    /// category counts are small (one per team).
    pub async fn find_category(&self, name: &str) -> Result<Option<Category>, ApiError> {
        let envelope: CategoryListEnvelope = self
            .request::<Empty, _>(Method::GET, "/categories.json", None, None)
            .await?;

        Ok(envelope
            .category_list
            .categories
            .into_iter()
            .find(|c| c.name == name))
    }

    /// Create a category restricted to the given groups.
    pub async fn create_category(
        &self,
        name: &str,
        color: &str,
        text_color: &str,
        permissions: &HashMap<String, i64>,
    ) -> Result<Category, ApiError> {
        let payload = CategoryPayload {
            name,
            color,
            text_color,
            permissions,
        };

        let envelope: CategoryEnvelope = self
            .request(Method::POST, "/categories.json", Some(&payload), None)
            .await?;
        Ok(envelope.category)
    }

    pub async fn delete_category(&self, category_id: i64) -> Result<(), ApiError> {
        self.execute::<Empty>(Method::DELETE, &format!("/categories/{category_id}"), None)
            .await
    }
}
