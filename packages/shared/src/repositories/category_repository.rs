use async_trait::async_trait;
use reqwest::Method;

#[cfg(test)]
use mockall::automock;

use crate::models::category::{Category, CategoryPayload, CategoryPercentageUpdate};
use crate::repositories::api_client::{HttpApiClient, NO_BODY};
use crate::repositories::errors::api_client_errors::ApiClientError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, ApiClientError>;
    async fn create_category(&self, payload: &CategoryPayload)
        -> Result<Category, ApiClientError>;
    async fn update_category(
        &self,
        category_id: &str,
        payload: &CategoryPayload,
    ) -> Result<(), ApiClientError>;
    async fn delete_category(&self, category_id: &str) -> Result<(), ApiClientError>;
    async fn batch_update_percentages(
        &self,
        updates: &[CategoryPercentageUpdate],
    ) -> Result<(), ApiClientError>;
}

#[async_trait]
impl CategoryRepository for HttpApiClient {
    async fn list_categories(&self) -> Result<Vec<Category>, ApiClientError> {
        self.get_json("/categories").await
    }

    async fn create_category(
        &self,
        payload: &CategoryPayload,
    ) -> Result<Category, ApiClientError> {
        self.send_json(Method::POST, "/categories", payload).await
    }

    async fn update_category(
        &self,
        category_id: &str,
        payload: &CategoryPayload,
    ) -> Result<(), ApiClientError> {
        self.send_empty(
            Method::PUT,
            &format!("/categories/{}", category_id),
            Some(payload),
        )
        .await
    }

    async fn delete_category(&self, category_id: &str) -> Result<(), ApiClientError> {
        self.send_empty(
            Method::DELETE,
            &format!("/categories/{}", category_id),
            NO_BODY,
        )
        .await
    }

    async fn batch_update_percentages(
        &self,
        updates: &[CategoryPercentageUpdate],
    ) -> Result<(), ApiClientError> {
        self.send_empty(
            Method::POST,
            "/categories/batch-update-percentages",
            Some(updates),
        )
        .await
    }
}
