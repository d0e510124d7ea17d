use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use swampnotes_core::health::health_routes;
use swampnotes_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    courses::{create_course, list_course_notes, list_courses},
    notes::{
        download_note, get_library, get_note, get_ownership, get_uploaded, purchase_note,
        search_notes, upload_note,
    },
    users::{credit_points, get_me, update_me},
};
use crate::state::AppState;

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        // Notes
        .route("/notes/search", get(search_notes))
        .route("/notes/upload", post(upload_note))
        .route("/notes/library", get(get_library))
        .route("/notes/uploaded", get(get_uploaded))
        .route("/notes/{id}", get(get_note))
        .route("/notes/{id}/owned", get(get_ownership))
        .route("/notes/{id}/purchase", post(purchase_note))
        .route("/notes/{id}/download", get(download_note))
        // Courses
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}/notes", get(list_course_notes))
        // Users
        .route("/users/me", get(get_me).patch(update_me))
        .route("/users/{id}/points", post(credit_points))
        .merge(health_routes())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer()),
        )
        .with_state(state)
}
