#![allow(async_fn_in_trait)]

use bytes::Bytes;

use swampnotes_domain::id::{CourseId, NoteId, UserId};
use swampnotes_domain::pagination::PageRequest;

use crate::domain::types::{Course, Note, NoteSearch, ProfileUpdate, Purchase, User};
use crate::error::MarketServiceError;

/// Repository for marketplace accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, MarketServiceError>;
    async fn find_by_subject(&self, subject: &str) -> Result<Option<User>, MarketServiceError>;
    /// Insert `user` unless an account with the same subject exists.
    /// Returns `true` if a row was inserted.
    async fn insert_if_absent(&self, user: &User) -> Result<bool, MarketServiceError>;
    /// Apply a profile update; `None` if the user does not exist.
    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, MarketServiceError>;
}

/// Balance writes outside the purchase flow.
pub trait PointsLedger: Send + Sync {
    /// Add `amount` to the user's balance and return the new balance.
    async fn credit(&self, user_id: UserId, amount: i64) -> Result<i64, MarketServiceError>;
}

/// Repository for notes and their counters.
pub trait NoteRepository: Send + Sync {
    async fn find_by_id(&self, id: NoteId) -> Result<Option<Note>, MarketServiceError>;
    async fn create(&self, note: &Note) -> Result<(), MarketServiceError>;
    /// Matching notes, most recent first.
    async fn search(&self, search: &NoteSearch) -> Result<Vec<Note>, MarketServiceError>;
    /// Notes authored by `author_id`, most recent first.
    async fn list_by_author(
        &self,
        author_id: UserId,
        page: PageRequest,
    ) -> Result<Vec<Note>, MarketServiceError>;
    /// Notes `user_id` holds purchase records for, most recent purchase first.
    async fn list_purchased(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Vec<Note>, MarketServiceError>;
    /// Relaxed counter bump; lost increments are tolerated.
    async fn increment_downloads(&self, id: NoteId) -> Result<(), MarketServiceError>;
    async fn increment_views(&self, id: NoteId) -> Result<(), MarketServiceError>;
}

/// Read side of purchase records.
pub trait PurchaseRepository: Send + Sync {
    async fn exists(&self, user_id: UserId, note_id: NoteId) -> Result<bool, MarketServiceError>;
}

pub trait CourseRepository: Send + Sync {
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, MarketServiceError>;
    /// All courses ordered by code.
    async fn list(&self) -> Result<Vec<Course>, MarketServiceError>;
    /// Fails with `CourseAlreadyExists` if `(code, school)` is taken.
    async fn create(&self, course: &Course) -> Result<(), MarketServiceError>;
}

/// Opens isolated units of work for the purchase transaction.
pub trait PurchaseUnitOfWork: Send + Sync {
    type Tx: PurchaseTransaction;

    async fn begin(&self) -> Result<Self::Tx, MarketServiceError>;
}

/// Operations available inside one purchase transaction.
///
/// Nothing is visible to other callers until [`commit`](Self::commit).
/// Dropping an unfinished transaction rolls it back.
pub trait PurchaseTransaction: Send {
    async fn find_note(&mut self, id: NoteId) -> Result<Option<Note>, MarketServiceError>;
    async fn purchase_exists(
        &mut self,
        user_id: UserId,
        note_id: NoteId,
    ) -> Result<bool, MarketServiceError>;
    /// Debit `amount` and return the new balance. Debits of one user are
    /// serialised; fails with `InsufficientFunds` if the balance would go
    /// negative, leaving it untouched.
    async fn debit(&mut self, user_id: UserId, amount: i64) -> Result<i64, MarketServiceError>;
    /// Insert unless a record for the same (user, note) exists.
    /// Returns `false` on conflict.
    async fn insert_purchase(&mut self, purchase: &Purchase) -> Result<bool, MarketServiceError>;
    async fn commit(self) -> Result<(), MarketServiceError>;
    async fn rollback(self) -> Result<(), MarketServiceError>;
}

/// Blob storage for note files, keyed by content handle.
pub trait ContentStore: Send + Sync {
    async fn put(&self, handle: &str, bytes: Bytes) -> Result<(), MarketServiceError>;
    async fn get(&self, handle: &str) -> Result<Option<Bytes>, MarketServiceError>;
    /// Remove the object; a missing handle is not an error.
    async fn delete(&self, handle: &str) -> Result<(), MarketServiceError>;
}
