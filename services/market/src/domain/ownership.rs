//! Ownership rule for (user, note) pairs.

use swampnotes_domain::id::UserId;

use super::types::Note;

/// Derived download rights of a user over a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    /// A purchase record exists or the note is free.
    pub owned: bool,
    pub is_author: bool,
    /// `owned || is_author`.
    pub can_download: bool,
}

impl Ownership {
    /// Resolve from current state. `purchased` is whether a purchase record
    /// exists for the pair; it must be read fresh for every request.
    pub fn resolve(user_id: UserId, note: &Note, purchased: bool) -> Self {
        let owned = purchased || note.is_free;
        let is_author = note.author_id == user_id;
        Self {
            owned,
            is_author,
            can_download: owned || is_author,
        }
    }
}
