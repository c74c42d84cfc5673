use async_trait::async_trait;
use reqwest::Method;

#[cfg(test)]
use mockall::automock;

use crate::models::auth::responses::MessageResponse;
use crate::models::user::{ChangePasswordRequest, UpdateProfileRequest, UserProfile};
use crate::repositories::api_client::HttpApiClient;
use crate::repositories::errors::api_client_errors::ApiClientError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile(&self) -> Result<UserProfile, ApiClientError>;
    async fn update_profile(&self, payload: &UpdateProfileRequest) -> Result<(), ApiClientError>;
    async fn change_password(
        &self,
        payload: &ChangePasswordRequest,
    ) -> Result<MessageResponse, ApiClientError>;
}

#[async_trait]
impl ProfileRepository for HttpApiClient {
    async fn get_profile(&self) -> Result<UserProfile, ApiClientError> {
        self.get_json("/profile").await
    }

    async fn update_profile(&self, payload: &UpdateProfileRequest) -> Result<(), ApiClientError> {
        self.send_empty(Method::PUT, "/profile", Some(payload))
            .await
    }

    async fn change_password(
        &self,
        payload: &ChangePasswordRequest,
    ) -> Result<MessageResponse, ApiClientError> {
        self.send_json_or_default(Method::POST, "/profile/change-password", payload)
            .await
    }
}
