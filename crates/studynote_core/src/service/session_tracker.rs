//! Global single-slot study session tracker.
//!
//! # Responsibility
//! - Hold the start instant of the one in-progress study session.
//! - Close the session onto a note's history through the store.
//!
//! # Invariants
//! - At most one session is open across the whole notebook.
//! - `start` while running keeps the original start instant.
//! - `end` while idle touches nothing.
//! - An open session is never persisted; only the closed interval is.
//! - A failed write keeps the session open so the start is not lost.

use crate::kv::KvStore;
use crate::model::note::NoteId;
use crate::model::session::StudySession;
use crate::store::{NoteStore, StoreResult};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};

/// Tracker state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Running(DateTime<Utc>),
}

/// Idle/Running state machine for the active study session.
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    state: SessionState,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Running(_))
    }

    /// Start instant of the open session, if any.
    pub fn running_since(&self) -> Option<DateTime<Utc>> {
        match self.state {
            SessionState::Running(started_at) => Some(started_at),
            SessionState::Idle => None,
        }
    }

    /// Time elapsed in the open session as of `now`.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.running_since().map(|started_at| now - started_at)
    }

    /// Opens a session starting now. Returns `false` if one is already open.
    pub fn start_session(&mut self) -> bool {
        self.start_session_at(Utc::now())
    }

    /// Opens a session starting at `now`. Returns `false` if one is already open.
    pub fn start_session_at(&mut self, now: DateTime<Utc>) -> bool {
        if let SessionState::Running(started_at) = self.state {
            debug!(
                "event=session_start module=session status=skip reason=already_running started_at={}",
                started_at.to_rfc3339()
            );
            return false;
        }

        self.state = SessionState::Running(now);
        info!(
            "event=session_start module=session status=ok started_at={}",
            now.to_rfc3339()
        );
        true
    }

    /// Closes the open session now and appends it to `note_id`.
    pub fn end_session<S: KvStore>(
        &mut self,
        note_id: &NoteId,
        store: &mut NoteStore<S>,
    ) -> StoreResult<Option<StudySession>> {
        self.end_session_at(note_id, store, Utc::now())
    }

    /// Closes the open session at `now` and appends it to `note_id`.
    ///
    /// Returns the recorded session, or `None` when idle or when the note no
    /// longer exists (the interval is then discarded and the tracker resets).
    ///
    /// # Errors
    /// - Propagates the store's persistence failure; the session stays open.
    pub fn end_session_at<S: KvStore>(
        &mut self,
        note_id: &NoteId,
        store: &mut NoteStore<S>,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<StudySession>> {
        let SessionState::Running(started_at) = self.state else {
            debug!("event=session_end module=session status=skip reason=idle note_id={note_id}");
            return Ok(None);
        };

        let session = StudySession::closed(started_at, now);
        let recorded = store.append_session(note_id, session.clone())?;
        self.state = SessionState::Idle;

        if !recorded {
            warn!(
                "event=session_end module=session status=skip reason=note_not_found note_id={note_id}"
            );
            return Ok(None);
        }

        info!(
            "event=session_end module=session status=ok note_id={} duration_ms={}",
            note_id,
            (now - started_at).num_milliseconds()
        );
        Ok(Some(session))
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionState, SessionTracker};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn second_start_keeps_original_instant() {
        let t0 = Utc
            .with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
            .single()
            .expect("valid instant");
        let mut tracker = SessionTracker::new();

        assert!(tracker.start_session_at(t0));
        assert!(!tracker.start_session_at(t0 + Duration::minutes(5)));
        assert_eq!(tracker.state(), SessionState::Running(t0));
    }

    #[test]
    fn elapsed_is_reported_only_while_running() {
        let t0 = Utc
            .with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
            .single()
            .expect("valid instant");
        let mut tracker = SessionTracker::new();
        assert!(tracker.elapsed_at(t0).is_none());

        tracker.start_session_at(t0);
        assert_eq!(
            tracker.elapsed_at(t0 + Duration::seconds(42)),
            Some(Duration::seconds(42))
        );
        assert!(tracker.is_running());
    }
}
