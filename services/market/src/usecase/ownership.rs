use swampnotes_domain::id::{NoteId, UserId};

use crate::domain::ownership::Ownership;
use crate::domain::repository::{NoteRepository, PurchaseRepository};
use crate::domain::types::Note;
use crate::error::MarketServiceError;

/// Load a note and resolve the caller's rights over it from current state.
pub(crate) async fn resolve_ownership<N, P>(
    notes: &N,
    purchases: &P,
    user_id: UserId,
    note_id: NoteId,
) -> Result<(Note, Ownership), MarketServiceError>
where
    N: NoteRepository,
    P: PurchaseRepository,
{
    let note = notes
        .find_by_id(note_id)
        .await?
        .ok_or(MarketServiceError::NoteNotFound)?;
    let purchased = purchases.exists(user_id, note_id).await?;
    let ownership = Ownership::resolve(user_id, &note, purchased);
    Ok((note, ownership))
}

pub struct ResolveOwnershipUseCase<N: NoteRepository, P: PurchaseRepository> {
    pub notes: N,
    pub purchases: P,
}

impl<N: NoteRepository, P: PurchaseRepository> ResolveOwnershipUseCase<N, P> {
    pub async fn execute(
        &self,
        user_id: UserId,
        note_id: NoteId,
    ) -> Result<Ownership, MarketServiceError> {
        let (_, ownership) = resolve_ownership(&self.notes, &self.purchases, user_id, note_id).await?;
        Ok(ownership)
    }
}
