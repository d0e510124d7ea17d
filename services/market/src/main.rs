use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use swampnotes_auth_types::token::TokenVerifier;
use swampnotes_core::tracing::init_tracing;
use swampnotes_market::config::{JwtKey, MarketConfig};
use swampnotes_market::infra::storage::FsContentStore;
use swampnotes_market::router::build_router;
use swampnotes_market::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = MarketConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let content = FsContentStore::new(&config.content_dir)
        .await
        .expect("failed to open content store");

    let mut verifier = match &config.jwt_key {
        JwtKey::Secret(secret) => TokenVerifier::hs256(secret),
        JwtKey::PublicKeyPem(pem) => {
            TokenVerifier::rs256_pem(pem.as_bytes()).expect("invalid AUTH_JWT_PUBLIC_KEY")
        }
    };
    if let Some(issuer) = &config.auth_issuer {
        verifier = verifier.with_issuer(issuer);
    }
    if let Some(audience) = &config.auth_audience {
        verifier = verifier.with_audience(audience);
    }

    let state = AppState {
        db: Arc::new(db),
        verifier: Arc::new(verifier),
        content,
        signup_points: config.signup_points,
    };

    let router = build_router(state, config.max_upload_bytes);
    let http_addr = format!("0.0.0.0:{}", config.market_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!(content_dir = %config.content_dir.display(), "market service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
