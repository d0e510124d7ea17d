//! Bearer JWT verification.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "USE_ONLY_IN_TESTS", test))]
use serde::Serialize;
use serde_json::Value;

use swampnotes_domain::user::{is_truthy, role_grants_admin};

/// Verified identity extracted from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable user identifier assigned by the identity provider (`sub`).
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Admin rights asserted by the provider through `is_admin` or `role`.
    pub is_admin: bool,
}

/// Errors returned by [`TokenVerifier::verify`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("invalid issuer or audience")]
    InvalidClaims,
    #[error("malformed token")]
    Malformed,
    #[error("invalid verification key")]
    InvalidKey,
}

/// JWT claims payload issued by the identity provider.
///
/// # Fields
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | provider user id |
/// | `exp` | `exp` | expiration, seconds since epoch |
/// | `email`, `name` | custom | profile hints for first contact |
/// | `role` | custom | `admin`/`dev`/`developer`/`superadmin` grant admin |
/// | `is_admin` | custom | bool, `1`, or a truthy string |
///
/// # Feature gate
///
/// [`Serialize`] requires the **`USE_ONLY_IN_TESTS`** cargo feature. Production
/// code never issues tokens.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_TESTS", test), derive(Serialize))]
pub struct IdentityClaims {
    pub sub: String,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<Value>,
}

impl IdentityClaims {
    fn into_identity(self) -> Result<Identity, AuthError> {
        if self.sub.trim().is_empty() {
            return Err(AuthError::Malformed);
        }
        let flag = self.is_admin.as_ref().is_some_and(claim_is_truthy);
        let by_role = self.role.as_deref().is_some_and(role_grants_admin);
        Ok(Identity {
            subject: self.sub,
            email: self.email,
            name: self.name,
            is_admin: flag || by_role,
        })
    }
}

fn claim_is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => is_truthy(s),
        _ => false,
    }
}

/// Verifies bearer tokens against a fixed key and claim policy.
///
/// Validation: `exp` and `sub` required, default 60s leeway for clock skew.
/// Issuer and audience are only checked when configured.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Shared-secret verifier (HS256).
    pub fn hs256(secret: &str) -> Self {
        Self::new(
            DecodingKey::from_secret(secret.as_bytes()),
            Algorithm::HS256,
        )
    }

    /// Public-key verifier (RS256) for provider-signed tokens.
    pub fn rs256_pem(pem: &[u8]) -> Result<Self, AuthError> {
        let key = DecodingKey::from_rsa_pem(pem).map_err(|_| AuthError::InvalidKey)?;
        Ok(Self::new(key, Algorithm::RS256))
    }

    fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self { key, validation }
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self.validation
            .set_required_spec_claims(&["exp", "sub", "iss"]);
        self
    }

    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self
    }

    /// Decode and validate a raw token, returning the verified identity.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<IdentityClaims>(token, &self.key, &self.validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidEcdsaKey
                | ErrorKind::InvalidRsaKey(_) => AuthError::InvalidSignature,
                ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => AuthError::InvalidClaims,
                _ => AuthError::Malformed,
            }
        })?;
        data.claims.into_identity()
    }
}

// ── Feature-gated: tests only ────────────────────────────────────────────

/// Sign claims with an HS256 secret.
///
/// Requires the `USE_ONLY_IN_TESTS` feature; used by test helpers to stand in
/// for the identity provider.
#[cfg(any(feature = "USE_ONLY_IN_TESTS", test))]
pub fn issue_hs256_token(
    claims: &IdentityClaims,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    use jsonwebtoken::{EncodingKey, Header, encode};
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
