use crate::repositories::errors::api_client_errors::ApiClientError;
use crate::repositories::errors::storage_errors::StorageError;

#[derive(Debug)]
pub enum SessionError {
    Api(ApiClientError),
    Storage(StorageError),
    ValidationError(String),
    NotAuthenticated,
    InvalidToken,
    ExpiredToken,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Api(err) => write!(f, "API error: {}", err),
            SessionError::Storage(err) => write!(f, "Storage error: {}", err),
            SessionError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            SessionError::NotAuthenticated => write!(f, "No active session"),
            SessionError::InvalidToken => write!(f, "Invalid session token"),
            SessionError::ExpiredToken => write!(f, "Session token has expired"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ApiClientError> for SessionError {
    fn from(err: ApiClientError) -> Self {
        SessionError::Api(err)
    }
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        SessionError::Storage(err)
    }
}
