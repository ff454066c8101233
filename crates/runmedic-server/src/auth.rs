//! Caller credential extraction.
//!
//! The server does not authenticate callers itself. The `Authorization`
//! header is required to carry a `Bearer ` token, which is forwarded
//! verbatim to the resource API where the real check happens.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use runmedic_types::BearerCredential;

use crate::error::ServerError;

/// The caller's bearer credential, extracted from the request headers.
///
/// Rejects with 400 `Invalid or missing Authorization token.` when the
/// header is absent, not valid UTF-8, or lacks the `Bearer ` scheme.
#[derive(Debug, Clone)]
pub struct ForwardedCredential(pub BearerCredential);

impl<S> FromRequestParts<S> for ForwardedCredential
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        credential_from_headers(&parts.headers).map(ForwardedCredential)
    }
}

/// Read the bearer credential from a header map.
pub fn credential_from_headers(headers: &HeaderMap) -> Result<BearerCredential, ServerError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(BearerCredential::from_header)
        .ok_or_else(ServerError::invalid_token)
}
