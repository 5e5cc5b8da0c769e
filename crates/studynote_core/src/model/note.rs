//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted note record (`RawNote`) that references tags by id.
//! - Define the resolved projection (`Note`) that carries full `Tag` values.
//! - Define the mutation payload (`RawNoteData`) accepted by the store.
//!
//! # Invariants
//! - `RawNote::id` never changes after creation.
//! - `tag_ids` may reference deleted tags; resolution filters them out.
//! - An absent `sessions` field is equivalent to an empty history but is
//!   preserved as absent on re-persist.
//!
//! # See also
//! - `store::resolve`

use crate::model::session::{total_seconds, StudySession};
use crate::model::tag::{Tag, TagId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque note identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
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

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Editable note fields, used for both create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawNoteData {
    pub title: String,
    pub markdown: String,
    pub tag_ids: Vec<TagId>,
    /// `None` on update keeps the existing history.
    pub sessions: Option<Vec<StudySession>>,
}

impl RawNoteData {
    pub fn new(title: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            markdown: markdown.into(),
            tag_ids: Vec::new(),
            sessions: None,
        }
    }

    /// Builds note input from selected tag objects, keeping only their ids.
    pub fn with_tags(title: impl Into<String>, markdown: impl Into<String>, tags: &[Tag]) -> Self {
        let mut data = Self::new(title, markdown);
        data.tag_ids = tags.iter().map(|tag| tag.id.clone()).collect();
        data
    }
}

/// Canonical persisted note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNote {
    pub id: NoteId,
    pub title: String,
    pub markdown: String,
    pub tag_ids: Vec<TagId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Vec<StudySession>>,
}

impl RawNote {
    /// Creates a note with a generated id.
    pub fn new(data: RawNoteData) -> Self {
        Self::with_id(NoteId::generate(), data)
    }

    pub fn with_id(id: NoteId, data: RawNoteData) -> Self {
        Self {
            id,
            title: data.title,
            markdown: data.markdown,
            tag_ids: data.tag_ids,
            sessions: data.sessions,
        }
    }

    /// Replaces editable fields; `id` is untouched.
    pub fn apply(&mut self, data: RawNoteData) {
        self.title = data.title;
        self.markdown = data.markdown;
        self.tag_ids = data.tag_ids;
        if let Some(sessions) = data.sessions {
            self.sessions = Some(sessions);
        }
    }

    /// Session history, empty when absent.
    pub fn sessions(&self) -> &[StudySession] {
        self.sessions.as_deref().unwrap_or(&[])
    }

    /// Extracts the editable fields, materializing the session history.
    pub fn to_data(&self) -> RawNoteData {
        RawNoteData {
            title: self.title.clone(),
            markdown: self.markdown.clone(),
            tag_ids: self.tag_ids.clone(),
            sessions: Some(self.sessions().to_vec()),
        }
    }

    pub fn total_study_seconds(&self) -> f64 {
        total_seconds(self.sessions())
    }
}

/// Read-only projection of a `RawNote` with tag ids resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub markdown: String,
    pub tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Vec<StudySession>>,
}

impl Note {
    pub fn sessions(&self) -> &[StudySession] {
        self.sessions.as_deref().unwrap_or(&[])
    }

    pub fn has_tag(&self, tag_id: &TagId) -> bool {
        self.tags.iter().any(|tag| &tag.id == tag_id)
    }

    pub fn total_study_seconds(&self) -> f64 {
        total_seconds(self.sessions())
    }
}
