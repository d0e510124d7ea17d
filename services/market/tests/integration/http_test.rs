use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode, header::AUTHORIZATION};
use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use tempfile::TempDir;
use uuid::Uuid;

use swampnotes_auth_types::token::TokenVerifier;
use swampnotes_market::infra::storage::FsContentStore;
use swampnotes_market::router::build_router;
use swampnotes_market::state::AppState;
use swampnotes_market_schema::users;
use swampnotes_testing::auth::{MockAuth, TEST_JWT_SECRET};

struct Harness {
    server: TestServer,
    _content_dir: TempDir,
}

async fn harness(db: DatabaseConnection) -> Harness {
    let content_dir = TempDir::new().unwrap();
    let state = AppState {
        db: Arc::new(db),
        verifier: Arc::new(TokenVerifier::hs256(TEST_JWT_SECRET)),
        content: FsContentStore::new(content_dir.path()).await.unwrap(),
        signup_points: 100,
    };
    Harness {
        server: TestServer::new(build_router(state, 1024 * 1024)).unwrap(),
        _content_dir: content_dir,
    }
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn user_row(subject: &str, points: i64) -> users::Model {
    let at = Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap();
    users::Model {
        id: Uuid::now_v7(),
        subject: subject.into(),
        email: format!("{subject}@ufl.edu"),
        name: None,
        display_name: Some("Albert".into()),
        bio: None,
        is_profile_public: true,
        show_email: false,
        is_admin: false,
        points,
        created_at: at,
        updated_at: at,
    }
}

fn bearer(auth: &MockAuth) -> HeaderValue {
    auth.headers()[AUTHORIZATION].clone()
}

#[tokio::test]
async fn should_serve_health_probes() {
    let h = harness(empty_db()).await;
    h.server.get("/healthz").await.assert_status_ok();
    h.server.get("/readyz").await.assert_status_ok();
}

#[tokio::test]
async fn should_attach_request_id_to_responses() {
    let h = harness(empty_db()).await;
    let response = h.server.get("/healthz").await;
    let id = response.header("x-request-id");
    assert!(id.to_str().unwrap().parse::<Uuid>().is_ok());
}

#[tokio::test]
async fn should_reject_profile_request_without_token() {
    let h = harness(empty_db()).await;
    let response = h.server.get("/users/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "UNAUTHORIZED");
}

#[tokio::test]
async fn should_reject_purchase_without_token() {
    let h = harness(empty_db()).await;
    let response = h
        .server
        .post(&format!("/notes/{}/purchase", Uuid::now_v7()))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_token_signed_with_other_secret() {
    let h = harness(empty_db()).await;
    let forged = swampnotes_auth_types::token::issue_hs256_token(
        &swampnotes_auth_types::token::IdentityClaims {
            sub: "intruder".into(),
            exp: u64::from(u32::MAX),
            email: None,
            name: None,
            role: Some("admin".into()),
            is_admin: None,
        },
        "not-the-test-secret",
    )
    .unwrap();
    let response = h
        .server
        .get("/users/me")
        .add_header(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {forged}")).unwrap(),
        )
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_return_current_user_with_points() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row("user_abc", 75)]])
        .into_connection();
    let h = harness(db).await;

    let response = h
        .server
        .get("/users/me")
        .add_header(AUTHORIZATION, bearer(&MockAuth::user("user_abc")))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["sub"], "user_abc");
    assert_eq!(body["points"], 75);
    assert_eq!(body["is_admin"], false);
    assert_eq!(body["created_at"], "2025-09-01T12:00:00.000Z");
}

#[tokio::test]
async fn should_forbid_course_creation_for_non_admin() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row("student_1", 0)]])
        .into_connection();
    let h = harness(db).await;

    let response = h
        .server
        .post("/courses")
        .add_header(AUTHORIZATION, bearer(&MockAuth::user("student_1")))
        .json(&serde_json::json!({
            "code": "COP3502",
            "title": "Programming Fundamentals 1",
            "school": "UF",
        }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "FORBIDDEN");
}

#[tokio::test]
async fn should_forbid_points_credit_for_non_admin() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row("student_2", 0)]])
        .into_connection();
    let h = harness(db).await;

    let response = h
        .server
        .post(&format!("/users/{}/points", Uuid::now_v7()))
        .add_header(AUTHORIZATION, bearer(&MockAuth::user("student_2")))
        .json(&serde_json::json!({ "amount": 500 }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_reject_malformed_search_query() {
    let h = harness(empty_db()).await;
    let response = h.server.get("/notes/search?limit=lots").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "INVALID_QUERY");
}

#[tokio::test]
async fn should_reject_malformed_library_page_with_error_envelope() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row("reader_1", 40)]])
        .into_connection();
    let h = harness(db).await;

    let response = h
        .server
        .get("/notes/library?limit=-3")
        .add_header(AUTHORIZATION, bearer(&MockAuth::user("reader_1")))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "INVALID_QUERY");
}

#[tokio::test]
async fn should_reject_malformed_course_notes_page() {
    let h = harness(empty_db()).await;
    let response = h
        .server
        .get(&format!("/courses/{}/notes?offset=later", Uuid::now_v7()))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "INVALID_QUERY");
}
