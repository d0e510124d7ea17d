use chrono::{DateTime, Utc};

use swampnotes_domain::id::{CourseId, NoteId, PurchaseId, UserId};
use swampnotes_domain::pagination::PageRequest;

/// Content type every uploaded note is stored with.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Marketplace account. `points` is never negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Identity-provider subject the account was created for.
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub is_profile_public: bool,
    pub show_email: bool,
    pub is_admin: bool,
    pub points: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Self-service profile changes. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub is_profile_public: Option<bool>,
    pub show_email: Option<bool>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.bio.is_none()
            && self.is_profile_public.is_none()
            && self.show_email.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    pub title: String,
    pub school: String,
    pub created_at: DateTime<Utc>,
}

/// An uploaded note. Author and price are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub author_id: UserId,
    pub course_id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub course_name: String,
    pub semester: String,
    /// Always 0 when `is_free`.
    pub price: i64,
    pub is_free: bool,
    /// Key of the note's bytes in the content store.
    pub content_handle: String,
    pub content_type: String,
    pub downloads: i64,
    pub views: i64,
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Points a purchase of this note debits.
    pub fn effective_price(&self) -> i64 {
        if self.is_free { 0 } else { self.price }
    }
}

/// Immutable record of one debit-for-access event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    pub id: PurchaseId,
    pub user_id: UserId,
    pub note_id: NoteId,
    /// Note price at purchase time, not a live reference.
    pub price_paid: i64,
    pub purchased_at: DateTime<Utc>,
}

/// Catalog filter. Every present criterion must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteSearch {
    /// Case-insensitive substring of title, description or course name.
    pub query: Option<String>,
    pub course_id: Option<CourseId>,
    pub semester: Option<String>,
    pub page: PageRequest,
}

impl NoteSearch {
    /// Whether `note` satisfies the filter criteria (pagination aside).
    pub fn matches(&self, note: &Note) -> bool {
        if let Some(course_id) = self.course_id {
            if note.course_id != course_id {
                return false;
            }
        }
        if let Some(ref semester) = self.semester {
            if &note.semester != semester {
                return false;
            }
        }
        match self.query {
            Some(ref query) => {
                let needle = query.to_lowercase();
                note.title.to_lowercase().contains(&needle)
                    || note.course_name.to_lowercase().contains(&needle)
                    || note
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

/// Bytes and metadata released by the download gate.
#[derive(Debug, Clone)]
pub struct NoteContent {
    pub bytes: bytes::Bytes,
    pub content_type: String,
    /// Suggested attachment file name.
    pub filename: String,
}
