use axum::{http::StatusCode, Json};
use serde::Serialize;
use thiserror::Error;

use crate::i18n::{Catalog, MessageKey};
use crate::storage::StorageError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

/// Failures a handler can report to the client
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or invalid API key")]
    Unauthorized,
    #[error("missing required field")]
    InvalidInput,
    #[error("malformed request: {0}")]
    BadRequest(String),
    #[error("{0} is already blacklisted")]
    DuplicateEntry(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidInput => ApiError::InvalidInput,
            StorageError::Duplicate(ip) => ApiError::DuplicateEntry(ip),
            StorageError::Other(e) => ApiError::Internal(e),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidInput | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateEntry(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Status and localized body; internal causes are logged, never returned
    pub fn localize(self, catalog: &Catalog) -> (StatusCode, Json<ErrorResponse>) {
        let status = self.status();
        let message = match &self {
            ApiError::Unauthorized => catalog.get(MessageKey::Unauthorized).to_string(),
            ApiError::InvalidInput => catalog.get(MessageKey::IpAddressRequired).to_string(),
            ApiError::BadRequest(detail) => {
                tracing::debug!(detail = %detail, "rejected malformed request");
                catalog.get(MessageKey::InvalidRequest).to_string()
            }
            ApiError::DuplicateEntry(ip) => catalog.with_ip(MessageKey::IpAlreadyBlacklisted, ip),
            ApiError::Internal(e) => {
                tracing::error!(error = ?e, "An error occurred");
                catalog.get(MessageKey::InternalError).to_string()
            }
        };

        (status, Json(ErrorResponse { message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Translations;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidInput.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::BadRequest("bad path".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::DuplicateEntry("1.2.3.4".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("disk on fire")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let translations = Translations::load().unwrap();
        let (status, Json(body)) =
            ApiError::Internal(anyhow::anyhow!("disk on fire")).localize(translations.catalog("en"));

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "An internal error occurred");
    }

    #[test]
    fn test_bad_request_hides_extractor_detail() {
        let translations = Translations::load().unwrap();
        let (status, Json(body)) = ApiError::BadRequest("Invalid UTF-8 in `ip`".into())
            .localize(translations.catalog("zh-Hant"));

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "無效的請求");
    }

    #[test]
    fn test_storage_error_conversion() {
        assert!(matches!(
            ApiError::from(StorageError::InvalidInput),
            ApiError::InvalidInput
        ));
        assert!(matches!(
            ApiError::from(StorageError::Duplicate("1.2.3.4".into())),
            ApiError::DuplicateEntry(ip) if ip == "1.2.3.4"
        ));
        assert!(matches!(
            ApiError::from(StorageError::Other(anyhow::anyhow!("gone"))),
            ApiError::Internal(_)
        ));
    }
}
