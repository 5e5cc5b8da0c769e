//! Canonical note/tag state and its write-through persistence.
//!
//! # Responsibility
//! - Own the canonical `RawNote` and `Tag` lists.
//! - Persist the full mutated list after every mutation.
//! - Derive the resolved `Note` projection on demand.
//!
//! # Invariants
//! - Mutations that miss their target id are silent no-ops (no write).
//! - In-memory state changes only after the write succeeded.

use crate::kv::KvError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod note_store;
pub mod resolve;

pub use note_store::NoteStore;
pub use resolve::{resolve_note, resolve_notes};

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence failure aborting a load or mutation.
#[derive(Debug)]
pub enum StoreError {
    /// Key-value read or write failed.
    Persistence(KvError),
    /// Stored JSON does not have the expected record shape.
    Decode {
        key: String,
        source: serde_json::Error,
    },
    /// In-memory records could not be encoded.
    Encode(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence(err) => write!(f, "persistence failure: {err}"),
            Self::Decode { key, source } => {
                write!(f, "persisted records under `{key}` are invalid: {source}")
            }
            Self::Encode(err) => write!(f, "failed to encode records: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::Decode { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<KvError> for StoreError {
    fn from(value: KvError) -> Self {
        Self::Persistence(value)
    }
}
