use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("{endpoint} unreachable: {source}")]
    NetworkUnreachable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} rejected with status {status}")]
    ServerRejected {
        endpoint: String,
        status: u16,
        message: Option<String>,
        raw: String,
    },
    #[error("{endpoint} returned a malformed response (status {status})")]
    MalformedResponse {
        endpoint: String,
        status: u16,
        raw: String,
    },
}

impl ApiError {
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::ServerRejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            Self::NetworkUnreachable { .. } => None,
            Self::ServerRejected { raw, .. } | Self::MalformedResponse { raw, .. } => Some(raw),
        }
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("cache file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache file serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("project {0} does not exist")]
    UnknownProject(usize),
    #[error("project {0} is locked")]
    Locked(usize),
    #[error("project {project} has no task {task}")]
    UnknownTask { project: usize, task: usize },
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Locked(_) => Self::forbidden(err.to_string()),
            SessionError::UnknownProject(_) | SessionError::UnknownTask { .. } => {
                Self::not_found(err.to_string())
            }
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
