//! Persistent key-value substrate.
//!
//! # Responsibility
//! - Define the opaque get/set-by-key contract the note store persists into.
//! - Provide in-memory and SQLite-backed implementations.
//!
//! # Invariants
//! - A missing key is `Ok(None)`, never an error.
//! - Values are whole JSON documents; `set` replaces the previous document.
//! - Malformed stored JSON is reported, never silently discarded.

use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryKvStore;
pub use schema::{SchemaUpgrade, SCHEMA_VERSION};
pub use sqlite::SqliteKvStore;

pub type KvResult<T> = Result<T, KvError>;

/// Read/write failure of the key-value substrate.
#[derive(Debug)]
pub enum KvError {
    /// Storage backend failure (I/O, sqlite, quota).
    Sqlite(rusqlite::Error),
    /// Database file was written by a newer schema than this build knows.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
    /// Stored text under `key` is not valid JSON.
    Json {
        key: String,
        source: serde_json::Error,
    },
    /// Connection was never upgraded to the `kv_entries` schema.
    MissingRequiredTable(&'static str),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "kv schema version {found} is newer than supported {supported}"
            ),
            Self::Json { key, source } => write!(f, "malformed json under key `{key}`: {source}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Json { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Opaque get/set-by-key JSON store.
pub trait KvStore {
    /// Reads the document stored under `key`.
    fn get(&self, key: &str) -> KvResult<Option<Value>>;
    /// Replaces the document stored under `key`.
    fn set(&mut self, key: &str, value: &Value) -> KvResult<()>;
}

impl<T: KvStore + ?Sized> KvStore for &mut T {
    fn get(&self, key: &str) -> KvResult<Option<Value>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &Value) -> KvResult<()> {
        (**self).set(key, value)
    }
}

pub(crate) fn parse_document(key: &str, text: &str) -> KvResult<Value> {
    serde_json::from_str(text).map_err(|source| KvError::Json {
        key: key.to_string(),
        source,
    })
}
