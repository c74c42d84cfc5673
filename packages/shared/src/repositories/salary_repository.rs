use async_trait::async_trait;
use reqwest::Method;

#[cfg(test)]
use mockall::automock;

use crate::models::salary::{Salary, SalaryPayload};
use crate::repositories::api_client::HttpApiClient;
use crate::repositories::errors::api_client_errors::ApiClientError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SalaryRepository: Send + Sync {
    async fn list_salaries(&self) -> Result<Vec<Salary>, ApiClientError>;
    /// The backend replaces any salary already recorded for the same month.
    async fn upsert_salary(&self, payload: &SalaryPayload) -> Result<Salary, ApiClientError>;
}

#[async_trait]
impl SalaryRepository for HttpApiClient {
    async fn list_salaries(&self) -> Result<Vec<Salary>, ApiClientError> {
        self.get_json("/salaries").await
    }

    async fn upsert_salary(&self, payload: &SalaryPayload) -> Result<Salary, ApiClientError> {
        self.send_json(Method::POST, "/salaries", payload).await
    }
}
