//! Domain model for notes, tags and study sessions.
//!
//! # Responsibility
//! - Define the canonical persisted records (`RawNote`, `Tag`).
//! - Define the resolved read projection (`Note`) handed to view callers.
//! - Define closed study intervals and their duration arithmetic.
//!
//! # Invariants
//! - Ids are opaque strings; generated ids are UUID v4 text but persisted ids
//!   are never re-validated, so foreign ids (e.g. `welcome-note`) round-trip.
//! - `Note` is never persisted; it is rebuilt from `RawNote` + `Tag` lists.

pub mod note;
pub mod session;
pub mod tag;
