use std::collections::BTreeMap;

use serde::Deserialize;

/// Failure of a single round-trip through the API gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiClientError {
    /// The request never produced a response (connection, timeout, TLS).
    Transport(String),
    /// The backend answered 401; the session has been invalidated.
    Unauthorized,
    /// Non-2xx with a structured validation body.
    Validation {
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },
    /// Non-2xx with a plain message.
    Status { status: u16, message: String },
    Serialization(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiClientError {
    /// Classifies a non-2xx, non-401 response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                title,
                message,
                errors: Some(errors),
            }) if !errors.is_empty() => ApiClientError::Validation {
                message: message
                    .or(title)
                    .unwrap_or_else(|| "Validation failed".to_string()),
                errors,
            },
            Ok(ErrorBody { title, message, .. }) => ApiClientError::Status {
                status,
                message: message
                    .or(title)
                    .unwrap_or_else(|| fallback_message(status, body)),
            },
            Err(_) => ApiClientError::Status {
                status,
                message: fallback_message(status, body),
            },
        }
    }

    /// First field-level message of a validation failure, if any.
    pub fn first_field_message(&self) -> Option<&str> {
        match self {
            ApiClientError::Validation { errors, .. } => errors
                .values()
                .flat_map(|messages| messages.iter())
                .map(String::as_str)
                .next(),
            _ => None,
        }
    }

    /// Message suitable for showing to the user as-is.
    pub fn user_message(&self) -> String {
        match self {
            ApiClientError::Validation { message, .. } => self
                .first_field_message()
                .map(str::to_string)
                .unwrap_or_else(|| message.clone()),
            ApiClientError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

fn fallback_message(status: u16, body: &str) -> String {
    let trimmed = body.trim().trim_matches('"');
    if trimmed.is_empty() {
        format!("Request failed with status {}", status)
    } else {
        trimmed.to_string()
    }
}

impl std::fmt::Display for ApiClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiClientError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ApiClientError::Unauthorized => write!(f, "Session is no longer valid"),
            ApiClientError::Validation { message, .. } => {
                write!(f, "Validation error: {}", message)
            }
            ApiClientError::Status { status, message } => {
                write!(f, "Request failed ({}): {}", status, message)
            }
            ApiClientError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for ApiClientError {}

impl From<reqwest::Error> for ApiClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiClientError::Serialization(err.to_string())
        } else {
            ApiClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiClientError {
    fn from(err: serde_json::Error) -> Self {
        ApiClientError::Serialization(err.to_string())
    }
}
