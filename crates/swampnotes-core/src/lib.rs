//! Cross-cutting plumbing shared by SwampNotes services: error envelope,
//! health probes, request ids, tracing setup, env helpers and serde helpers.

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
