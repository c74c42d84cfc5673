use async_trait::async_trait;
use reqwest::Method;

#[cfg(test)]
use mockall::automock;

use crate::models::auth::requests::{LoginRequest, RegisterRequest};
use crate::models::auth::responses::LoginResponse;
use crate::repositories::api_client::HttpApiClient;
use crate::repositories::errors::api_client_errors::ApiClientError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiClientError>;
    async fn register(&self, data: &RegisterRequest) -> Result<(), ApiClientError>;
}

#[async_trait]
impl AuthRepository for HttpApiClient {
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiClientError> {
        self.send_json(Method::POST, "/Auth/login", credentials)
            .await
    }

    async fn register(&self, data: &RegisterRequest) -> Result<(), ApiClientError> {
        self.send_empty(Method::POST, "/Auth/register", Some(data))
            .await
    }
}
