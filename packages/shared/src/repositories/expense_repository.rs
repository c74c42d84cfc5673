use async_trait::async_trait;
use reqwest::Method;

#[cfg(test)]
use mockall::automock;

use crate::models::expense::{CreateExpensePayload, Expense, UpdateExpensePayload};
use crate::repositories::api_client::{HttpApiClient, NO_BODY};
use crate::repositories::errors::api_client_errors::ApiClientError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn list_expenses(&self) -> Result<Vec<Expense>, ApiClientError>;
    async fn create_expense(
        &self,
        payload: &CreateExpensePayload,
    ) -> Result<Expense, ApiClientError>;
    async fn update_expense(
        &self,
        expense_id: &str,
        payload: &UpdateExpensePayload,
    ) -> Result<(), ApiClientError>;
    async fn delete_expense(&self, expense_id: &str) -> Result<(), ApiClientError>;
}

#[async_trait]
impl ExpenseRepository for HttpApiClient {
    async fn list_expenses(&self) -> Result<Vec<Expense>, ApiClientError> {
        self.get_json("/expenses").await
    }

    async fn create_expense(
        &self,
        payload: &CreateExpensePayload,
    ) -> Result<Expense, ApiClientError> {
        self.send_json(Method::POST, "/expenses", payload).await
    }

    async fn update_expense(
        &self,
        expense_id: &str,
        payload: &UpdateExpensePayload,
    ) -> Result<(), ApiClientError> {
        self.send_empty(
            Method::PUT,
            &format!("/expenses/{}", expense_id),
            Some(payload),
        )
        .await
    }

    async fn delete_expense(&self, expense_id: &str) -> Result<(), ApiClientError> {
        self.send_empty(
            Method::DELETE,
            &format!("/expenses/{}", expense_id),
            NO_BODY,
        )
        .await
    }
}
