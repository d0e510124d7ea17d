pub mod courses;
pub mod current_user;
pub mod notes;
pub mod users;
