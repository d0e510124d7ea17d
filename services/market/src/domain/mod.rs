pub mod ownership;
pub mod repository;
pub mod types;
