//! Bearer-token identity extractor.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use http::request::Parts;

use swampnotes_core::error::AppError;

use crate::token::{Identity, TokenVerifier};

/// Caller identity verified from `Authorization: Bearer <jwt>`.
///
/// Returns 401 if the header is absent, not a bearer credential, or the token
/// fails verification. Role enforcement (403) is done by handlers after
/// extraction.
#[derive(Debug, Clone)]
pub struct BearerIdentity(pub Identity);

impl<S> FromRequestParts<S> for BearerIdentity
where
    S: Send + Sync,
    Arc<TokenVerifier>: FromRef<S>,
{
    type Rejection = AppError;

    // Verification is synchronous; do it before the future so the returned
    // block borrows nothing from `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let verifier = Arc::<TokenVerifier>::from_ref(state);
        let result = match parts.headers.typed_get::<Authorization<Bearer>>() {
            Some(Authorization(bearer)) => verifier.verify(bearer.token()).map_err(|e| {
                tracing::debug!(error = %e, "bearer token rejected");
                AppError::Unauthorized
            }),
            None => Err(AppError::Unauthorized),
        };
        async move { result.map(Self) }
    }
}
