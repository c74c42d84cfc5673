use crate::repositories::errors::api_client_errors::ApiClientError;

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryError {
    Api(ApiClientError),
    ValidationError(String),
}

impl std::fmt::Display for CategoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryError::Api(err) => write!(f, "API error: {}", err),
            CategoryError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for CategoryError {}

impl From<ApiClientError> for CategoryError {
    fn from(err: ApiClientError) -> Self {
        CategoryError::Api(err)
    }
}
