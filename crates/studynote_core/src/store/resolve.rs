//! Tag resolution for the read projection.
//!
//! # Invariants
//! - One `Note` per `RawNote`, in list order.
//! - Resolved tags follow `tag_ids` order, skip ids with no matching tag and
//!   never repeat a tag.
//! - Pure function of its inputs; nothing here is cached.

use crate::model::note::{Note, RawNote};
use crate::model::tag::{Tag, TagId};
use std::collections::{HashMap, HashSet};

/// Resolves every raw note against the current tag list.
pub fn resolve_notes(notes: &[RawNote], tags: &[Tag]) -> Vec<Note> {
    let index = index_tags(tags);
    notes.iter().map(|note| resolve_with(note, &index)).collect()
}

/// Resolves a single raw note.
pub fn resolve_note(note: &RawNote, tags: &[Tag]) -> Note {
    resolve_with(note, &index_tags(tags))
}

fn index_tags(tags: &[Tag]) -> HashMap<&TagId, &Tag> {
    let mut index = HashMap::with_capacity(tags.len());
    for tag in tags {
        index.entry(&tag.id).or_insert(tag);
    }
    index
}

fn resolve_with(note: &RawNote, index: &HashMap<&TagId, &Tag>) -> Note {
    let mut seen = HashSet::new();
    let tags = note
        .tag_ids
        .iter()
        .filter(|tag_id| seen.insert(*tag_id))
        .filter_map(|tag_id| index.get(tag_id).map(|tag| (*tag).clone()))
        .collect();

    Note {
        id: note.id.clone(),
        title: note.title.clone(),
        markdown: note.markdown.clone(),
        tags,
        sessions: note.sessions.clone(),
    }
}
