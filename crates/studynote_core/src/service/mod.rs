//! Use-case services over the note store.
//!
//! # Responsibility
//! - Derive per-tag aggregates from resolved notes.
//! - Track the global study session and close it onto notes.
//! - Present one facade to view callers.

pub mod aggregation;
pub mod notebook_service;
pub mod session_tracker;
