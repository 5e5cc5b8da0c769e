//! Notebook facade for view callers.
//!
//! # Responsibility
//! - Expose the full surface a presentation layer may call: resolved notes,
//!   tags, per-tag aggregates, note/tag mutations and the two session entry
//!   points.
//! - Keep the session tracker and the store it writes into together.
//!
//! # Invariants
//! - Every read of notes or aggregates is recomputed from canonical state.
//! - Mutations delegate to `NoteStore` and inherit its write-through contract.

use crate::config::StoreConfig;
use crate::kv::KvStore;
use crate::model::note::{Note, NoteId, RawNote, RawNoteData};
use crate::model::session::StudySession;
use crate::model::tag::{Tag, TagId};
use crate::search::filter::{filter_notes, NoteFilter};
use crate::service::aggregation::TagAggregates;
use crate::service::session_tracker::{SessionState, SessionTracker};
use crate::store::{NoteStore, StoreResult};
use chrono::{DateTime, Utc};

/// Notebook use-case service over a key-value backend.
pub struct NotebookService<S: KvStore> {
    store: NoteStore<S>,
    tracker: SessionTracker,
}

impl<S: KvStore> NotebookService<S> {
    /// Loads the notebook from `kv` with default keys.
    pub fn open(kv: S) -> StoreResult<Self> {
        Self::open_with_config(kv, StoreConfig::default())
    }

    pub fn open_with_config(kv: S, config: StoreConfig) -> StoreResult<Self> {
        Ok(Self::from_store(NoteStore::load_with_config(kv, config)?))
    }

    pub fn from_store(store: NoteStore<S>) -> Self {
        Self {
            store,
            tracker: SessionTracker::new(),
        }
    }

    /// Resolved notes in creation order.
    pub fn notes(&self) -> Vec<Note> {
        self.store.resolve_notes()
    }

    pub fn note(&self, id: &NoteId) -> Option<Note> {
        self.store.resolve_note(id)
    }

    pub fn raw_notes(&self) -> &[RawNote] {
        self.store.notes()
    }

    pub fn tags(&self) -> &[Tag] {
        self.store.tags()
    }

    /// Per-tag note counts and study time.
    pub fn tag_aggregates(&self) -> TagAggregates {
        TagAggregates::compute(&self.notes(), self.store.tags())
    }

    /// Resolved notes matching `filter`.
    pub fn filter_notes(&self, filter: &NoteFilter) -> Vec<Note> {
        filter_notes(&self.notes(), filter)
    }

    pub fn create_note(&mut self, data: RawNoteData) -> StoreResult<NoteId> {
        self.store.create_note(data)
    }

    pub fn update_note(&mut self, id: &NoteId, data: RawNoteData) -> StoreResult<bool> {
        self.store.update_note(id, data)
    }

    pub fn delete_note(&mut self, id: &NoteId) -> StoreResult<bool> {
        self.store.delete_note(id)
    }

    pub fn create_tag(&mut self, tag: Tag) -> StoreResult<()> {
        self.store.create_tag(tag)
    }

    pub fn update_tag(&mut self, id: &TagId, label: impl Into<String>) -> StoreResult<bool> {
        self.store.update_tag(id, label)
    }

    pub fn delete_tag(&mut self, id: &TagId) -> StoreResult<bool> {
        self.store.delete_tag(id)
    }

    pub fn session_state(&self) -> SessionState {
        self.tracker.state()
    }

    /// Starts the global study session; `false` if one is already running.
    pub fn start_session(&mut self) -> bool {
        self.tracker.start_session()
    }

    pub fn start_session_at(&mut self, now: DateTime<Utc>) -> bool {
        self.tracker.start_session_at(now)
    }

    /// Ends the running session onto `note_id`.
    pub fn end_session(&mut self, note_id: &NoteId) -> StoreResult<Option<StudySession>> {
        self.tracker.end_session(note_id, &mut self.store)
    }

    pub fn end_session_at(
        &mut self,
        note_id: &NoteId,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<StudySession>> {
        self.tracker.end_session_at(note_id, &mut self.store, now)
    }

    pub fn store(&self) -> &NoteStore<S> {
        &self.store
    }

    pub fn into_store(self) -> NoteStore<S> {
        self.store
    }
}
