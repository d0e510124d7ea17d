use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use swampnotes_domain::id::CourseId;
use swampnotes_domain::pagination::PageRequest;

use crate::domain::types::Course;
use crate::error::MarketServiceError;
use crate::handlers::current_user::CurrentUser;
use crate::handlers::notes::{NoteResponse, invalid_query, note_list};
use crate::state::AppState;
use crate::usecase::course::{
    CreateCourseInput, CreateCourseUseCase, ListCourseNotesUseCase, ListCoursesUseCase,
};

#[derive(Serialize)]
pub struct CourseResponse {
    pub id: CourseId,
    pub code: String,
    pub title: String,
    pub school: String,
    #[serde(serialize_with = "swampnotes_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            code: course.code,
            title: course.title,
            school: course.school,
            created_at: course.created_at,
        }
    }
}

// ── GET /courses ─────────────────────────────────────────────────────────────

pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, MarketServiceError> {
    let usecase = ListCoursesUseCase {
        courses: state.course_repo(),
    };
    let courses = usecase.execute().await?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

// ── POST /courses ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateCourseRequest {
    pub code: String,
    pub title: String,
    pub school: String,
}

pub async fn create_course(
    current: CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>), MarketServiceError> {
    current.require_admin()?;
    let usecase = CreateCourseUseCase {
        courses: state.course_repo(),
    };
    let course = usecase
        .execute(CreateCourseInput {
            code: body.code,
            title: body.title,
            school: body.school,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(course.into())))
}

// ── GET /courses/{id}/notes ──────────────────────────────────────────────────

pub async fn list_course_notes(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
    page: Result<Query<PageRequest>, QueryRejection>,
) -> Result<Json<Vec<NoteResponse>>, MarketServiceError> {
    let Query(page) = page.map_err(invalid_query)?;
    let usecase = ListCourseNotesUseCase {
        courses: state.course_repo(),
        notes: state.note_repo(),
    };
    let notes = usecase.execute(course_id, page).await?;
    Ok(note_list(notes))
}
