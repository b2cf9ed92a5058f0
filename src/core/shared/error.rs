use axum::{response::IntoResponse, Json};

use crate::llm::LlmError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("File type not supported. Allowed: {allowed}")]
    UnsupportedFileType { extension: String, allowed: String },
    #[error("File too large. Maximum size is {limit_mb}MB.")]
    FileTooLarge { size: usize, limit_mb: usize },
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("Upstream provider error: {0}")]
    Upstream(#[from] LlmError),
    #[error("Database error: {0}")]
    Persistence(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound(entity.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::UnsupportedFileType { .. } | Self::FileTooLarge { .. } | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(e: diesel::result::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

impl From<diesel::r2d2::PoolError> for ApiError {
    fn from(e: diesel::r2d2::PoolError) -> Self {
        Self::Persistence(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let message = self.to_string();
        match &self {
            Self::Upstream(_) | Self::Persistence(_) | Self::Internal(_) => {
                log::error!("{status}: {message}");
            }
            _ => log::debug!("{status}: {message}"),
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = ApiError::validation("Criteria weights must sum to 1.0 (current: 1.1)");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Criteria weights must sum to 1.0 (current: 1.1)"
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = ApiError::not_found("Document");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Document not found");
    }

    #[test]
    fn test_upstream_is_bad_gateway() {
        let err: ApiError = LlmError::EmptyContent.into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("Empty response"));
    }

    #[test]
    fn test_file_errors_are_client_errors() {
        let too_large = ApiError::FileTooLarge {
            size: 16 * 1024 * 1024,
            limit_mb: 15,
        };
        assert_eq!(too_large.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(too_large.to_string(), "File too large. Maximum size is 15MB.");

        let unsupported = ApiError::UnsupportedFileType {
            extension: "exe".to_string(),
            allowed: "pdf, txt".to_string(),
        };
        assert_eq!(unsupported.status_code(), StatusCode::BAD_REQUEST);
    }
}
