//! Per-tag dashboard aggregates.
//!
//! # Responsibility
//! - Count resolved notes carrying each tag.
//! - Sum study-session seconds across the notes carrying each tag.
//!
//! # Invariants
//! - Pure re-derivation from `(notes, tags)`; nothing is persisted or cached.
//! - Negative durations are summed as-is; a malformed session bound makes the
//!   affected tags' totals `NaN`.
//! - Unknown tag ids aggregate to zero.

use crate::model::note::Note;
use crate::model::session::{study_minutes, total_seconds};
use crate::model::tag::{Tag, TagId};
use log::warn;

/// Aggregate values for one tag.
#[derive(Debug, Clone, PartialEq)]
pub struct TagStats {
    pub tag: Tag,
    pub note_count: usize,
    pub study_seconds: f64,
}

impl TagStats {
    /// Study time rounded to whole minutes for display.
    pub fn study_minutes(&self) -> f64 {
        study_minutes(self.study_seconds)
    }
}

/// Aggregates for every tag, in tag-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagAggregates {
    stats: Vec<TagStats>,
}

impl TagAggregates {
    /// Computes aggregates for `tags` over resolved `notes`.
    pub fn compute(notes: &[Note], tags: &[Tag]) -> Self {
        let note_seconds: Vec<f64> = notes.iter().map(note_seconds).collect();

        let stats = tags
            .iter()
            .map(|tag| {
                let mut note_count = 0;
                let mut study_seconds = 0.0;
                for (note, seconds) in notes.iter().zip(&note_seconds) {
                    if note.has_tag(&tag.id) {
                        note_count += 1;
                        study_seconds += seconds;
                    }
                }
                TagStats {
                    tag: tag.clone(),
                    note_count,
                    study_seconds,
                }
            })
            .collect();

        Self { stats }
    }

    pub fn stats(&self) -> &[TagStats] {
        &self.stats
    }

    pub fn get(&self, tag_id: &TagId) -> Option<&TagStats> {
        self.stats.iter().find(|stats| &stats.tag.id == tag_id)
    }

    /// Number of notes carrying `tag_id`; `0` for unknown tags.
    pub fn note_count(&self, tag_id: &TagId) -> usize {
        self.get(tag_id).map_or(0, |stats| stats.note_count)
    }

    /// Total study seconds on notes carrying `tag_id`; `0.0` for unknown tags.
    pub fn study_time(&self, tag_id: &TagId) -> f64 {
        self.get(tag_id).map_or(0.0, |stats| stats.study_seconds)
    }
}

/// Counts resolved notes carrying `tag_id`.
pub fn note_count(notes: &[Note], tag_id: &TagId) -> usize {
    notes.iter().filter(|note| note.has_tag(tag_id)).count()
}

/// Sums study seconds over resolved notes carrying `tag_id`.
pub fn study_time(notes: &[Note], tag_id: &TagId) -> f64 {
    notes
        .iter()
        .filter(|note| note.has_tag(tag_id))
        .map(note_seconds)
        .sum()
}

fn note_seconds(note: &Note) -> f64 {
    let malformed = note
        .sessions()
        .iter()
        .filter_map(|session| session.duration_seconds().err())
        .count();
    if malformed > 0 {
        warn!(
            "event=study_time_sum module=aggregation status=degraded note_id={} malformed_sessions={}",
            note.id, malformed
        );
    }
    total_seconds(note.sessions())
}
