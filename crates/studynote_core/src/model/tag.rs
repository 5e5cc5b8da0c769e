//! Tag domain model.
//!
//! # Invariants
//! - `id` is immutable once assigned.
//! - Tag deletion never cascades into notes; see `store::resolve`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque tag identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(String);

impl TagId {
    /// Wraps an existing identifier without validation.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TagId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TagId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// User-visible label attached to notes by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub label: String,
}

impl Tag {
    /// Creates a tag with a generated id.
    ///
    /// Callers pre-generate tags this way before handing them to
    /// `NoteStore::create_tag`, which never assigns ids itself.
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_id(TagId::generate(), label)
    }

    pub fn with_id(id: TagId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}
