use crate::repositories::errors::api_client_errors::ApiClientError;

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileError {
    Api(ApiClientError),
    ValidationError(String),
}

impl std::fmt::Display for ProfileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileError::Api(err) => write!(f, "API error: {}", err),
            ProfileError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ProfileError {}

impl From<ApiClientError> for ProfileError {
    fn from(err: ApiClientError) -> Self {
        ProfileError::Api(err)
    }
}
