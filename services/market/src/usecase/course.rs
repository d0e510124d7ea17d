use chrono::Utc;

use swampnotes_domain::id::CourseId;
use swampnotes_domain::pagination::PageRequest;

use crate::domain::repository::{CourseRepository, NoteRepository};
use crate::domain::types::{Course, Note, NoteSearch};
use crate::error::MarketServiceError;

// ── ListCourses ──────────────────────────────────────────────────────────────

pub struct ListCoursesUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> ListCoursesUseCase<C> {
    pub async fn execute(&self) -> Result<Vec<Course>, MarketServiceError> {
        self.courses.list().await
    }
}

// ── CreateCourse ─────────────────────────────────────────────────────────────

pub struct CreateCourseInput {
    pub code: String,
    pub title: String,
    pub school: String,
}

/// Admin-only; the caller checks the role.
pub struct CreateCourseUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> CreateCourseUseCase<C> {
    pub async fn execute(&self, input: CreateCourseInput) -> Result<Course, MarketServiceError> {
        let code = input.code.trim();
        let title = input.title.trim();
        let school = input.school.trim();
        if code.is_empty() || title.is_empty() || school.is_empty() {
            return Err(MarketServiceError::MissingData);
        }
        let course = Course {
            id: CourseId::generate(),
            code: code.to_owned(),
            title: title.to_owned(),
            school: school.to_owned(),
            created_at: Utc::now(),
        };
        self.courses.create(&course).await?;
        Ok(course)
    }
}

// ── ListCourseNotes ──────────────────────────────────────────────────────────

pub struct ListCourseNotesUseCase<C: CourseRepository, N: NoteRepository> {
    pub courses: C,
    pub notes: N,
}

impl<C: CourseRepository, N: NoteRepository> ListCourseNotesUseCase<C, N> {
    pub async fn execute(
        &self,
        course_id: CourseId,
        page: PageRequest,
    ) -> Result<Vec<Note>, MarketServiceError> {
        if self.courses.find_by_id(course_id).await?.is_none() {
            return Err(MarketServiceError::CourseNotFound);
        }
        self.notes
            .search(&NoteSearch {
                course_id: Some(course_id),
                page: page.clamped(),
                ..Default::default()
            })
            .await
    }
}
