use async_trait::async_trait;
use reqwest::Method;

#[cfg(test)]
use mockall::automock;

use crate::models::auth::requests::LinkAccountRequest;
use crate::models::auth::responses::LoginResponse;
use crate::repositories::api_client::HttpApiClient;
use crate::repositories::errors::api_client_errors::ApiClientError;

/// Household membership changes. Each call answers with a fresh token that
/// reflects the new membership.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LinkingRepository: Send + Sync {
    async fn link_account(
        &self,
        request: &LinkAccountRequest,
    ) -> Result<LoginResponse, ApiClientError>;
    async fn unlink_account(&self) -> Result<LoginResponse, ApiClientError>;
    async fn toggle_dashboard(&self) -> Result<LoginResponse, ApiClientError>;
}

#[async_trait]
impl LinkingRepository for HttpApiClient {
    async fn link_account(
        &self,
        request: &LinkAccountRequest,
    ) -> Result<LoginResponse, ApiClientError> {
        self.send_json(Method::POST, "/linking/link", request).await
    }

    async fn unlink_account(&self) -> Result<LoginResponse, ApiClientError> {
        self.send_json(Method::POST, "/linking/unlink", &serde_json::json!({}))
            .await
    }

    async fn toggle_dashboard(&self) -> Result<LoginResponse, ApiClientError> {
        self.send_json(
            Method::POST,
            "/linking/toggle-dashboard",
            &serde_json::json!({}),
        )
        .await
    }
}
