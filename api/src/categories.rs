//! Class category taxonomy CRUD.

use serde::{Deserialize, Serialize};

use crate::{ApiClient, ApiResult, RequestKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassCategory {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Body for create and update requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClassCategoryInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

const CATEGORIES_PATH: &str = "class_categories";

impl ApiClient {
    pub async fn list_class_categories(&self) -> ApiResult<Vec<ClassCategory>> {
        self.get_json(RequestKind::Taxonomy, CATEGORIES_PATH, &[]).await
    }

    pub async fn create_class_category(
        &self,
        input: &ClassCategoryInput,
    ) -> ApiResult<ClassCategory> {
        let created: ClassCategory = self
            .post_json(RequestKind::Taxonomy, CATEGORIES_PATH, input)
            .await?;
        tracing::info!(category_id = %created.id, "Class category created");
        Ok(created)
    }

    pub async fn update_class_category(
        &self,
        id: &str,
        input: &ClassCategoryInput,
    ) -> ApiResult<ClassCategory> {
        self.patch_json(
            RequestKind::Taxonomy,
            &format!("{CATEGORIES_PATH}/{id}"),
            input,
        )
        .await
    }

    pub async fn delete_class_category(&self, id: &str) -> ApiResult<()> {
        self.delete(RequestKind::Taxonomy, &format!("{CATEGORIES_PATH}/{id}"))
            .await?;
        tracing::info!(category_id = %id, "Class category deleted");
        Ok(())
    }
}
