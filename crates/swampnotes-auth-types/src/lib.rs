//! Auth types shared across SwampNotes services.
//!
//! Identity is issued by an external provider; this crate only verifies the
//! bearer JWT it hands out and exposes the `BearerIdentity` extractor.

pub mod identity;
pub mod token;
