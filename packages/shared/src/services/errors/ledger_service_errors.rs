use crate::repositories::errors::api_client_errors::ApiClientError;

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    Api(ApiClientError),
    ValidationError(String),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::Api(err) => write!(f, "API error: {}", err),
            LedgerError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<ApiClientError> for LedgerError {
    fn from(err: ApiClientError) -> Self {
        LedgerError::Api(err)
    }
}
