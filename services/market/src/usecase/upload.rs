use bytes::Bytes;
use chrono::Utc;

use swampnotes_domain::id::{CourseId, NoteId, UserId};

use crate::domain::repository::{ContentStore, CourseRepository, NoteRepository};
use crate::domain::types::{Note, PDF_CONTENT_TYPE};
use crate::error::MarketServiceError;

pub struct UploadNoteInput {
    pub author_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub course_id: CourseId,
    pub course_name: String,
    pub semester: String,
    pub price: i64,
    pub is_free: bool,
    /// Content type declared by the client for the file part.
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Stores an uploaded PDF and creates its note.
pub struct UploadNoteUseCase<N: NoteRepository, C: CourseRepository, S: ContentStore> {
    pub notes: N,
    pub courses: C,
    pub content: S,
}

impl<N, C, S> UploadNoteUseCase<N, C, S>
where
    N: NoteRepository,
    C: CourseRepository,
    S: ContentStore,
{
    pub async fn execute(&self, input: UploadNoteInput) -> Result<Note, MarketServiceError> {
        let is_pdf = input
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with(PDF_CONTENT_TYPE));
        if !is_pdf {
            return Err(MarketServiceError::InvalidUpload(
                "only PDF files are accepted".into(),
            ));
        }
        if input.bytes.is_empty() {
            return Err(MarketServiceError::InvalidUpload("file is empty".into()));
        }
        let title = input.title.trim();
        let course_name = input.course_name.trim();
        let semester = input.semester.trim();
        if title.is_empty() || course_name.is_empty() || semester.is_empty() {
            return Err(MarketServiceError::MissingData);
        }
        if input.price < 0 {
            return Err(MarketServiceError::InvalidPrice);
        }
        if self.courses.find_by_id(input.course_id).await?.is_none() {
            return Err(MarketServiceError::CourseNotFound);
        }

        let id = NoteId::generate();
        let content_handle = format!("{id}.pdf");
        self.content.put(&content_handle, input.bytes).await?;

        let note = Note {
            id,
            author_id: input.author_id,
            course_id: input.course_id,
            title: title.to_owned(),
            description: input
                .description
                .map(|d| d.trim().to_owned())
                .filter(|d| !d.is_empty()),
            course_name: course_name.to_owned(),
            semester: semester.to_owned(),
            price: if input.is_free { 0 } else { input.price },
            is_free: input.is_free,
            content_handle,
            content_type: PDF_CONTENT_TYPE.to_owned(),
            downloads: 0,
            views: 0,
            created_at: Utc::now(),
        };
        if let Err(e) = self.notes.create(&note).await {
            // The stored file has no note pointing at it yet.
            if let Err(cleanup) = self.content.delete(&note.content_handle).await {
                tracing::warn!(
                    note_id = %note.id,
                    handle = %note.content_handle,
                    error = %cleanup,
                    "failed to remove content of rejected upload"
                );
            }
            return Err(e);
        }

        tracing::info!(note_id = %note.id, author_id = %note.author_id, price = note.price, "note uploaded");
        Ok(note)
    }
}
