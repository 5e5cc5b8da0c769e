//! Core domain logic for StudyNote.
//! This crate is the single source of truth for note, tag and study-session
//! state; view layers only read its projections and call its mutations.

pub mod config;
pub mod kv;
pub mod logging;
pub mod model;
pub mod search;
pub mod service;
pub mod store;

pub use config::StoreConfig;
pub use kv::{
    KvError, KvResult, KvStore, MemoryKvStore, SchemaUpgrade, SqliteKvStore, SCHEMA_VERSION,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteId, RawNote, RawNoteData};
pub use model::session::{study_minutes, StudySession, TimestampError};
pub use model::tag::{Tag, TagId};
pub use search::filter::{filter_notes, NoteFilter};
pub use service::aggregation::{TagAggregates, TagStats};
pub use service::notebook_service::NotebookService;
pub use service::session_tracker::{SessionState, SessionTracker};
pub use store::{NoteStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
