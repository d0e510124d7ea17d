use swampnotes_domain::id::{NoteId, UserId};
use swampnotes_domain::pagination::PageRequest;

use crate::domain::repository::NoteRepository;
use crate::domain::types::{Note, NoteSearch};
use crate::error::MarketServiceError;

// ── SearchNotes ──────────────────────────────────────────────────────────────

pub struct SearchNotesUseCase<N: NoteRepository> {
    pub notes: N,
}

impl<N: NoteRepository> SearchNotesUseCase<N> {
    pub async fn execute(&self, search: NoteSearch) -> Result<Vec<Note>, MarketServiceError> {
        self.notes.search(&normalize(search)).await
    }
}

/// Blank text criteria are treated as absent; the page window is clamped.
fn normalize(search: NoteSearch) -> NoteSearch {
    fn non_blank(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }
    NoteSearch {
        query: non_blank(search.query),
        course_id: search.course_id,
        semester: non_blank(search.semester),
        page: search.page.clamped(),
    }
}

// ── GetNote ──────────────────────────────────────────────────────────────────

/// Public note lookup; counts a view.
pub struct GetNoteUseCase<N: NoteRepository> {
    pub notes: N,
}

impl<N: NoteRepository> GetNoteUseCase<N> {
    pub async fn execute(&self, note_id: NoteId) -> Result<Note, MarketServiceError> {
        let mut note = self
            .notes
            .find_by_id(note_id)
            .await?
            .ok_or(MarketServiceError::NoteNotFound)?;
        match self.notes.increment_views(note_id).await {
            Ok(()) => note.views += 1,
            Err(e) => tracing::warn!(error = %e, %note_id, "failed to increment view counter"),
        }
        Ok(note)
    }
}

// ── ListLibrary ──────────────────────────────────────────────────────────────

/// Notes the caller has purchased.
pub struct ListLibraryUseCase<N: NoteRepository> {
    pub notes: N,
}

impl<N: NoteRepository> ListLibraryUseCase<N> {
    pub async fn execute(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Vec<Note>, MarketServiceError> {
        self.notes.list_purchased(user_id, page.clamped()).await
    }
}

// ── ListUploaded ─────────────────────────────────────────────────────────────

pub struct ListUploadedUseCase<N: NoteRepository> {
    pub notes: N,
}

impl<N: NoteRepository> ListUploadedUseCase<N> {
    pub async fn execute(
        &self,
        author_id: UserId,
        page: PageRequest,
    ) -> Result<Vec<Note>, MarketServiceError> {
        self.notes.list_by_author(author_id, page.clamped()).await
    }
}
