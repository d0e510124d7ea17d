//! Test utilities for SwampNotes services.
//!
//! Provides `MockAuth`, a stand-in for the external identity provider.
//! Import in `#[cfg(test)]` blocks and `tests/` only, never in production code.

pub mod auth;
