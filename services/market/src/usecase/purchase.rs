use chrono::Utc;

use swampnotes_domain::id::{NoteId, PurchaseId, UserId};

use crate::domain::repository::{PurchaseTransaction, PurchaseUnitOfWork};
use crate::domain::types::Purchase;
use crate::error::MarketServiceError;

/// Outcome of a successful purchase.
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    pub purchase: Purchase,
    /// Balance after the debit; `None` when nothing was debited.
    pub balance: Option<i64>,
}

/// Buys access to a note: debit the buyer and record the purchase as one
/// atomic unit.
///
/// At most one purchase exists per (user, note). When two requests for the
/// same pair race past the existence check, the unique insert picks the
/// winner and the loser's transaction is rolled back, undoing its debit.
pub struct PurchaseNoteUseCase<U: PurchaseUnitOfWork> {
    pub uow: U,
}

impl<U: PurchaseUnitOfWork> PurchaseNoteUseCase<U> {
    pub async fn execute(
        &self,
        user_id: UserId,
        note_id: NoteId,
    ) -> Result<PurchaseReceipt, MarketServiceError> {
        let mut tx = self.uow.begin().await?;

        let note = tx
            .find_note(note_id)
            .await?
            .ok_or(MarketServiceError::NoteNotFound)?;
        if note.author_id == user_id {
            return Err(MarketServiceError::SelfPurchase);
        }
        if tx.purchase_exists(user_id, note_id).await? {
            return Err(MarketServiceError::AlreadyOwned);
        }

        let price = note.effective_price();
        let balance = if price > 0 {
            Some(tx.debit(user_id, price).await?)
        } else {
            None
        };

        let purchase = Purchase {
            id: PurchaseId::generate(),
            user_id,
            note_id,
            price_paid: price,
            purchased_at: Utc::now(),
        };
        if !tx.insert_purchase(&purchase).await? {
            tx.rollback().await?;
            tracing::info!(%user_id, %note_id, price, "concurrent purchase won; debit reversed");
            return Err(MarketServiceError::AlreadyOwned);
        }
        tx.commit().await?;

        tracing::info!(%user_id, %note_id, price, "note purchased");
        Ok(PurchaseReceipt { purchase, balance })
    }
}
