//! Write-through note/tag store.
//!
//! # Responsibility
//! - Load canonical lists from the key-value store and seed the welcome note.
//! - Apply note/tag mutations and re-persist the whole mutated list.
//!
//! # Invariants
//! - Note ids are assigned here; tag ids are supplied by callers.
//! - Deleting a tag never touches any note's `tag_ids`.
//! - A failed write leaves the in-memory lists unchanged.
//! - No batching: one mutation, one `KvStore::set`.

use crate::config::{welcome_note, StoreConfig};
use crate::kv::KvStore;
use crate::model::note::{Note, NoteId, RawNote, RawNoteData};
use crate::model::session::StudySession;
use crate::model::tag::{Tag, TagId};
use crate::store::resolve::{resolve_note, resolve_notes};
use crate::store::{StoreError, StoreResult};
use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;

/// Canonical owner of notes and tags, persisted through `S`.
pub struct NoteStore<S: KvStore> {
    kv: S,
    config: StoreConfig,
    notes: Vec<RawNote>,
    tags: Vec<Tag>,
}

impl<S: KvStore> NoteStore<S> {
    /// Loads state using the default `NOTES` / `TAGS` keys.
    pub fn load(kv: S) -> StoreResult<Self> {
        Self::load_with_config(kv, StoreConfig::default())
    }

    /// Loads state, seeding the welcome note when no notes are persisted.
    ///
    /// # Errors
    /// - `StoreError::Persistence` when a read or the seed write fails.
    /// - `StoreError::Decode` when a stored document has the wrong shape.
    pub fn load_with_config(kv: S, config: StoreConfig) -> StoreResult<Self> {
        let started_at = Instant::now();
        let loaded = read_list::<RawNote, S>(&kv, &config.notes_key).and_then(|notes| {
            read_list::<Tag, S>(&kv, &config.tags_key).map(|tags| (notes, tags))
        });
        let (notes, tags) = match loaded {
            Ok(lists) => lists,
            Err(err) => {
                error!(
                    "event=store_load module=store status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        let mut store = Self {
            kv,
            config,
            notes,
            tags,
        };

        if store.notes.is_empty() && store.config.seed_welcome_note {
            store.commit_notes(vec![welcome_note()])?;
            info!("event=store_bootstrap module=store status=ok seeded=welcome_note");
        }

        info!(
            "event=store_load module=store status=ok notes={} tags={} duration_ms={}",
            store.notes.len(),
            store.tags.len(),
            started_at.elapsed().as_millis()
        );
        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Canonical notes in creation order.
    pub fn notes(&self) -> &[RawNote] {
        &self.notes
    }

    /// Canonical tags in creation order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn note(&self, id: &NoteId) -> Option<&RawNote> {
        self.notes.iter().find(|note| &note.id == id)
    }

    pub fn tag(&self, id: &TagId) -> Option<&Tag> {
        self.tags.iter().find(|tag| &tag.id == id)
    }

    /// Resolved projection of every note, rebuilt on each call.
    pub fn resolve_notes(&self) -> Vec<Note> {
        resolve_notes(&self.notes, &self.tags)
    }

    pub fn resolve_note(&self, id: &NoteId) -> Option<Note> {
        self.note(id).map(|note| resolve_note(note, &self.tags))
    }

    /// Appends a new note with a fresh id and returns that id.
    pub fn create_note(&mut self, data: RawNoteData) -> StoreResult<NoteId> {
        let note = RawNote::new(data);
        let id = note.id.clone();

        let mut next = self.notes.clone();
        next.push(note);
        self.commit_notes(next)?;

        info!("event=note_create module=store status=ok note_id={id}");
        Ok(id)
    }

    /// Replaces the editable fields of the note with `id`.
    ///
    /// Returns `Ok(false)` without writing when no note matches.
    pub fn update_note(&mut self, id: &NoteId, data: RawNoteData) -> StoreResult<bool> {
        if self.note(id).is_none() {
            debug!("event=note_update module=store status=skip reason=not_found note_id={id}");
            return Ok(false);
        }

        let mut next = self.notes.clone();
        for note in next.iter_mut().filter(|note| &note.id == id) {
            note.apply(data.clone());
        }
        self.commit_notes(next)?;

        info!("event=note_update module=store status=ok note_id={id}");
        Ok(true)
    }

    /// Removes the note with `id`. Returns `Ok(false)` when absent.
    pub fn delete_note(&mut self, id: &NoteId) -> StoreResult<bool> {
        if self.note(id).is_none() {
            debug!("event=note_delete module=store status=skip reason=not_found note_id={id}");
            return Ok(false);
        }

        let next = self
            .notes
            .iter()
            .filter(|note| &note.id != id)
            .cloned()
            .collect();
        self.commit_notes(next)?;

        info!("event=note_delete module=store status=ok note_id={id}");
        Ok(true)
    }

    /// Appends one closed session to a note's history through `update_note`.
    pub fn append_session(&mut self, id: &NoteId, session: StudySession) -> StoreResult<bool> {
        let Some(note) = self.note(id) else {
            debug!("event=session_append module=store status=skip reason=not_found note_id={id}");
            return Ok(false);
        };

        let mut data = note.to_data();
        data.sessions.get_or_insert_with(Vec::new).push(session);
        self.update_note(id, data)
    }

    /// Appends a caller-built tag. The id is taken as given.
    pub fn create_tag(&mut self, tag: Tag) -> StoreResult<()> {
        let id = tag.id.clone();

        let mut next = self.tags.clone();
        next.push(tag);
        self.commit_tags(next)?;

        info!("event=tag_create module=store status=ok tag_id={id}");
        Ok(())
    }

    /// Relabels the tag with `id`. Returns `Ok(false)` when absent.
    pub fn update_tag(&mut self, id: &TagId, label: impl Into<String>) -> StoreResult<bool> {
        if self.tag(id).is_none() {
            debug!("event=tag_update module=store status=skip reason=not_found tag_id={id}");
            return Ok(false);
        }

        let label = label.into();
        let mut next = self.tags.clone();
        for tag in next.iter_mut().filter(|tag| &tag.id == id) {
            tag.label = label.clone();
        }
        self.commit_tags(next)?;

        info!("event=tag_update module=store status=ok tag_id={id}");
        Ok(true)
    }

    /// Removes the tag with `id`; notes keep their now-dangling reference.
    pub fn delete_tag(&mut self, id: &TagId) -> StoreResult<bool> {
        if self.tag(id).is_none() {
            debug!("event=tag_delete module=store status=skip reason=not_found tag_id={id}");
            return Ok(false);
        }

        let next = self
            .tags
            .iter()
            .filter(|tag| &tag.id != id)
            .cloned()
            .collect();
        self.commit_tags(next)?;

        info!("event=tag_delete module=store status=ok tag_id={id}");
        Ok(true)
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Releases the backing key-value store.
    pub fn into_kv(self) -> S {
        self.kv
    }

    fn commit_notes(&mut self, next: Vec<RawNote>) -> StoreResult<()> {
        write_list(&mut self.kv, &self.config.notes_key, &next)?;
        self.notes = next;
        Ok(())
    }

    fn commit_tags(&mut self, next: Vec<Tag>) -> StoreResult<()> {
        write_list(&mut self.kv, &self.config.tags_key, &next)?;
        self.tags = next;
        Ok(())
    }
}

fn read_list<T: DeserializeOwned, K: KvStore>(kv: &K, key: &str) -> StoreResult<Vec<T>> {
    match kv.get(key)? {
        Some(value) => serde_json::from_value(value).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        }),
        None => Ok(Vec::new()),
    }
}

fn write_list<T: Serialize, K: KvStore>(kv: &mut K, key: &str, items: &[T]) -> StoreResult<()> {
    let value = serde_json::to_value(items).map_err(StoreError::Encode)?;
    kv.set(key, &value).map_err(|err| {
        error!(
            "event=store_persist module=store status=error key={} items={} error={}",
            key,
            items.len(),
            err
        );
        StoreError::from(err)
    })
}

#[cfg(test)]
mod tests {
    use super::NoteStore;
    use crate::kv::{KvStore, MemoryKvStore};
    use crate::model::note::{NoteId, RawNoteData};
    use crate::model::tag::{Tag, TagId};

    fn fresh_store() -> NoteStore<MemoryKvStore> {
        NoteStore::load(MemoryKvStore::new()).expect("empty store should load")
    }

    #[test]
    fn mutations_write_through_immediately() {
        let mut store = fresh_store();
        let id = store
            .create_note(RawNoteData::new("draft", "body"))
            .expect("create should persist");

        let persisted = store
            .kv()
            .get("NOTES")
            .expect("notes readable")
            .expect("notes key written");
        let ids: Vec<&str> = persisted
            .as_array()
            .expect("notes stored as array")
            .iter()
            .filter_map(|note| note["id"].as_str())
            .collect();
        assert_eq!(ids, vec!["welcome-note", id.as_str()]);
    }

    #[test]
    fn update_tag_relabels_in_place() {
        let mut store = fresh_store();
        store
            .create_tag(Tag::with_id(TagId::new("t"), "old"))
            .expect("create tag");

        assert!(store
            .update_tag(&TagId::new("t"), "new")
            .expect("update existing tag"));
        assert_eq!(
            store.tag(&TagId::new("t")).map(|tag| tag.label.as_str()),
            Some("new")
        );
        assert!(!store
            .update_tag(&TagId::new("missing"), "x")
            .expect("missed update is not an error"));
    }

    #[test]
    fn missed_note_mutations_do_not_write() {
        let mut store = fresh_store();
        let before = store.kv().raw("NOTES").map(str::to_string);

        let missing = NoteId::new("missing");
        assert!(!store
            .update_note(&missing, RawNoteData::new("x", "y"))
            .expect("missed update is not an error"));
        assert!(!store
            .delete_note(&missing)
            .expect("missed delete is not an error"));
        assert_eq!(store.kv().raw("NOTES").map(str::to_string), before);
        assert!(store.kv().raw("TAGS").is_none());
    }
}
