use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use crate::auth::lang_from_path;

/// Language tag of an `/api/{lang}/...` request
///
/// Read from the raw path so that a malformed tag still selects a catalog
/// (the default one) instead of rejecting the request.
#[derive(Debug, Clone)]
pub struct Lang(pub String);

impl<S> FromRequestParts<S> for Lang
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Lang(lang_from_path(parts.uri.path()).to_string()))
    }
}
