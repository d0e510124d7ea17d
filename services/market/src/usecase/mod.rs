pub mod catalog;
pub mod course;
pub mod download;
pub mod ledger;
pub mod ownership;
pub mod purchase;
pub mod upload;
pub mod user;
