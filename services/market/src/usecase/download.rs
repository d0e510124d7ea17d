use swampnotes_domain::id::{NoteId, UserId};

use crate::domain::repository::{ContentStore, NoteRepository, PurchaseRepository};
use crate::domain::types::{NoteContent, PDF_CONTENT_TYPE};
use crate::error::MarketServiceError;
use crate::usecase::ownership::resolve_ownership;

/// Releases note content to callers the ownership rule allows.
pub struct DownloadNoteUseCase<N: NoteRepository, P: PurchaseRepository, C: ContentStore> {
    pub notes: N,
    pub purchases: P,
    pub content: C,
}

impl<N, P, C> DownloadNoteUseCase<N, P, C>
where
    N: NoteRepository,
    P: PurchaseRepository,
    C: ContentStore,
{
    pub async fn execute(
        &self,
        user_id: UserId,
        note_id: NoteId,
    ) -> Result<NoteContent, MarketServiceError> {
        let (note, ownership) =
            resolve_ownership(&self.notes, &self.purchases, user_id, note_id).await?;
        if !ownership.can_download {
            return Err(MarketServiceError::Forbidden);
        }

        let bytes = self
            .content
            .get(&note.content_handle)
            .await?
            .ok_or(MarketServiceError::ContentNotFound)?;

        if let Err(e) = self.notes.increment_downloads(note_id).await {
            tracing::warn!(error = %e, %note_id, "failed to increment download counter");
        }

        let content_type = if note.content_type.trim().is_empty() {
            PDF_CONTENT_TYPE.to_owned()
        } else {
            note.content_type
        };
        Ok(NoteContent {
            bytes,
            content_type,
            filename: attachment_filename(&note.title),
        })
    }
}

/// `<title>.pdf` with characters unsafe in a quoted ASCII header value replaced.
fn attachment_filename(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' => '_',
            c if c.is_control() || !c.is_ascii() => '_',
            c => c,
        })
        .collect();
    if stem.is_empty() {
        "note.pdf".to_owned()
    } else {
        format!("{stem}.pdf")
    }
}
