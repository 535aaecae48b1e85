use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::api::ErrorResponse;
use crate::i18n::{MessageKey, Translations};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Checks the shared secret sent in `x-api-key`
pub struct AuthService {
    api_key: String,
}

impl AuthService {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub fn validate_key(&self, key: &str) -> bool {
        if self.api_key.is_empty() {
            return false;
        }

        self.api_key.as_bytes().ct_eq(key.as_bytes()).into()
    }
}

/// Language tag of an `/api/{lang}/...` path
pub fn lang_from_path(path: &str) -> &str {
    path.trim_start_matches('/')
        .strip_prefix("api/")
        .and_then(|rest| rest.split('/').next())
        .unwrap_or("")
}

pub async fn auth_middleware(
    auth_service: Arc<AuthService>,
    translations: Arc<Translations>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    if auth_service.validate_key(api_key) {
        return next.run(request).await;
    }

    let path = request.uri().path();
    tracing::warn!(path = %path, "rejected request with missing or invalid API key");

    let catalog = translations.catalog(lang_from_path(path));
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            message: catalog.get(MessageKey::Unauthorized).to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        let auth = AuthService::new("s3cret");
        assert!(auth.validate_key("s3cret"));
        assert!(!auth.validate_key("s3cret "));
        assert!(!auth.validate_key(""));
        assert!(!auth.validate_key("other"));
    }

    #[test]
    fn test_empty_configured_key_rejects_everything() {
        let auth = AuthService::new("");
        assert!(!auth.validate_key(""));
    }

    #[test]
    fn test_lang_from_path() {
        assert_eq!(lang_from_path("/api/zh-Hant/stats"), "zh-Hant");
        assert_eq!(lang_from_path("/api/en/visits/1.2.3.4"), "en");
        assert_eq!(lang_from_path("/api/xx"), "xx");
        assert_eq!(lang_from_path("/health"), "");
    }
}
