use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("session expired or not authorized")]
    Unauthorized { message: Option<String> },

    #[error("server responded with {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Message carried in the backend's `error` field, if it sent one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message } | ApiError::Status { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status(),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API url `{value}`: {source}")]
    InvalidUrl {
        value: String,
        source: url::ParseError,
    },

    #[error("invalid request timeout `{0}`")]
    InvalidTimeout(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_is_exposed_for_http_errors() {
        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            message: Some("Invalid username or password".into()),
        };
        assert_eq!(err.backend_message(), Some("Invalid username or password"));
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert!(err.to_string().contains("Invalid username or password"));

        let expired = ApiError::Unauthorized { message: None };
        assert_eq!(expired.backend_message(), None);
        assert_eq!(expired.status(), Some(StatusCode::UNAUTHORIZED));
    }
}
