use std::path::PathBuf;

use swampnotes_core::config::{optional, parsed_or, required};

/// How bearer tokens are verified.
#[derive(Debug, Clone)]
pub enum JwtKey {
    /// HS256 shared secret. Env var: `AUTH_JWT_SECRET`.
    Secret(String),
    /// RS256 PEM public key of the identity provider. Env var: `AUTH_JWT_PUBLIC_KEY`.
    PublicKeyPem(String),
}

/// Marketplace service configuration loaded from environment variables.
#[derive(Debug)]
pub struct MarketConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3114). Env var: `MARKET_PORT`.
    pub market_port: u16,
    pub jwt_key: JwtKey,
    /// Required `iss` claim, if any. Env var: `AUTH_ISSUER`.
    pub auth_issuer: Option<String>,
    /// Required `aud` claim, if any. Env var: `AUTH_AUDIENCE`.
    pub auth_audience: Option<String>,
    /// Root directory of the note content store (default `./data/notes`).
    pub content_dir: PathBuf,
    /// Balance granted to a user on first contact (default 100).
    pub signup_points: i64,
    /// Request body limit for uploads, in bytes (default 25 MiB).
    pub max_upload_bytes: usize,
}

impl MarketConfig {
    pub fn from_env() -> Self {
        let jwt_key = match optional("AUTH_JWT_PUBLIC_KEY") {
            Some(pem) => JwtKey::PublicKeyPem(pem),
            None => JwtKey::Secret(required("AUTH_JWT_SECRET")),
        };
        Self {
            database_url: required("DATABASE_URL"),
            market_port: parsed_or("MARKET_PORT", 3114),
            jwt_key,
            auth_issuer: optional("AUTH_ISSUER"),
            auth_audience: optional("AUTH_AUDIENCE"),
            content_dir: optional("CONTENT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/notes")),
            signup_points: parsed_or("SIGNUP_POINTS", 100),
            max_upload_bytes: parsed_or("MAX_UPLOAD_BYTES", 25 * 1024 * 1024),
        }
    }
}
