//! Mock identity-provider helpers for tests.
//!
//! Services verify a bearer JWT issued by the external auth provider. In
//! tests, `MockAuth` signs tokens with a shared HS256 secret so requests can
//! be authenticated without the real provider.

use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};

use swampnotes_auth_types::token::{IdentityClaims, issue_hs256_token};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

/// Configurable identity minted into test tokens.
pub struct MockAuth {
    pub subject: String,
    pub email: Option<String>,
    pub is_admin: bool,
}

impl MockAuth {
    pub fn user(subject: &str) -> Self {
        Self {
            subject: subject.to_owned(),
            email: Some(format!("{subject}@ufl.edu")),
            is_admin: false,
        }
    }

    pub fn admin(subject: &str) -> Self {
        Self {
            is_admin: true,
            ..Self::user(subject)
        }
    }

    /// Sign a token valid for one hour with [`TEST_JWT_SECRET`].
    pub fn token(&self) -> String {
        let exp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system clock before epoch")
            .as_secs()
            + 3600;
        let claims = IdentityClaims {
            sub: self.subject.clone(),
            exp,
            email: self.email.clone(),
            name: None,
            role: None,
            is_admin: Some(serde_json::Value::Bool(self.is_admin)),
        };
        issue_hs256_token(&claims, TEST_JWT_SECRET).expect("sign test token")
    }

    /// Return an `Authorization: Bearer` header map.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token()))
                .expect("token is a valid header value"),
        );
        map
    }
}
