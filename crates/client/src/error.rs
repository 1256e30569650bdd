//! Error taxonomy for backend calls.

use std::fmt;

use thiserror::Error;

/// Coarse classification of a failed backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    Transport,
    Validation,
    /// The resource already exists.
    Conflict,
    Authentication,
    NotFound,
    RateLimited,
    Server,
    /// The response body could not be decoded.
    Decode,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Transport => "transport error",
            ErrorKind::Validation => "validation error",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Authentication => "authentication error",
            ErrorKind::NotFound => "not found",
            ErrorKind::RateLimited => "rate limited",
            ErrorKind::Server => "server error",
            ErrorKind::Decode => "invalid response",
            ErrorKind::Unknown => "unexpected error",
        };
        f.write_str(name)
    }
}

/// A failed backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, message)
    }

    /// Classify an HTTP error response.
    ///
    /// The backend reports a duplicate reading as `400` with an
    /// "already exists" detail, so that case is treated as a conflict too.
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        let message = detail.into();
        let kind = match status {
            400 if is_duplicate_detail(&message) => ErrorKind::Conflict,
            400 | 422 => ErrorKind::Validation,
            401 | 403 => ErrorKind::Authentication,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            429 => ErrorKind::RateLimited,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Unknown,
        };

        Self {
            kind,
            status: Some(status),
            message,
        }
    }

    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Transport | ErrorKind::RateLimited | ErrorKind::Server
        )
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == ErrorKind::Conflict
    }

    pub fn is_auth(&self) -> bool {
        self.kind == ErrorKind::Authentication
    }
}

fn is_duplicate_detail(detail: &str) -> bool {
    let detail = detail.to_lowercase();
    detail.contains("already exists") || detail.contains("already in")
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            return ApiError::decode(value.to_string());
        }
        match value.status() {
            Some(status) => ApiError::from_status(status.as_u16(), value.to_string()),
            None => ApiError::transport(value.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::decode(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::from_status(400, "Title required").kind, ErrorKind::Validation);
        assert_eq!(ApiError::from_status(401, "").kind, ErrorKind::Authentication);
        assert_eq!(ApiError::from_status(403, "").kind, ErrorKind::Authentication);
        assert_eq!(ApiError::from_status(404, "").kind, ErrorKind::NotFound);
        assert_eq!(ApiError::from_status(409, "").kind, ErrorKind::Conflict);
        assert_eq!(ApiError::from_status(429, "").kind, ErrorKind::RateLimited);
        assert_eq!(ApiError::from_status(503, "").kind, ErrorKind::Server);
        assert_eq!(ApiError::from_status(418, "").kind, ErrorKind::Unknown);
    }

    #[test]
    fn duplicate_reading_detail_is_a_conflict() {
        let err = ApiError::from_status(400, "Reading entry already exists for this book");
        assert!(err.is_conflict());
        assert_eq!(err.status, Some(400));
    }

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(ApiError::transport("connection reset").is_retryable());
        assert!(ApiError::from_status(502, "").is_retryable());
        assert!(ApiError::from_status(429, "").is_retryable());
        assert!(!ApiError::from_status(409, "").is_retryable());
        assert!(!ApiError::from_status(401, "").is_retryable());
        assert!(!ApiError::from_status(400, "").is_retryable());
    }
}
