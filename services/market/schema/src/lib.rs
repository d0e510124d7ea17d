//! sea-orm entities for the marketplace database.

pub mod courses;
pub mod notes;
pub mod purchases;
pub mod users;
