use async_trait::async_trait;
use reqwest::Method;

#[cfg(test)]
use mockall::automock;

use crate::models::user::{AdminUser, LinkingPermissionRequest};
use crate::repositories::api_client::{HttpApiClient, NO_BODY};
use crate::repositories::errors::api_client_errors::ApiClientError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn list_users(&self) -> Result<Vec<AdminUser>, ApiClientError>;
    async fn activate_user(&self, user_id: i64) -> Result<(), ApiClientError>;
    async fn deactivate_user(&self, user_id: i64) -> Result<(), ApiClientError>;
    async fn set_linking_permission(
        &self,
        user_id: i64,
        request: &LinkingPermissionRequest,
    ) -> Result<(), ApiClientError>;
    async fn delete_user(&self, user_id: i64) -> Result<(), ApiClientError>;
}

#[async_trait]
impl AdminRepository for HttpApiClient {
    async fn list_users(&self) -> Result<Vec<AdminUser>, ApiClientError> {
        self.get_json("/admin/users").await
    }

    async fn activate_user(&self, user_id: i64) -> Result<(), ApiClientError> {
        self.send_empty(
            Method::POST,
            &format!("/admin/users/{}/activate", user_id),
            NO_BODY,
        )
        .await
    }

    async fn deactivate_user(&self, user_id: i64) -> Result<(), ApiClientError> {
        self.send_empty(
            Method::POST,
            &format!("/admin/users/{}/deactivate", user_id),
            NO_BODY,
        )
        .await
    }

    async fn set_linking_permission(
        &self,
        user_id: i64,
        request: &LinkingPermissionRequest,
    ) -> Result<(), ApiClientError> {
        self.send_empty(
            Method::PUT,
            &format!("/admin/users/{}/linking", user_id),
            Some(request),
        )
        .await
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), ApiClientError> {
        self.send_empty(
            Method::DELETE,
            &format!("/admin/users/{}", user_id),
            NO_BODY,
        )
        .await
    }
}
