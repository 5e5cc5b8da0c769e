//! Process-local key-value store.

use super::{parse_document, KvResult, KvStore};
use serde_json::Value;
use std::collections::BTreeMap;

/// In-memory store keeping serialized JSON text per key.
///
/// Text (not `Value`) is stored so reads go through the same parse path as
/// durable backends.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: BTreeMap<String, String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw text under `key` without validation.
    pub fn insert_raw(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    /// Returns the raw text stored under `key`.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> KvResult<Option<Value>> {
        self.entries
            .get(key)
            .map(|text| parse_document(key, text))
            .transpose()
    }

    fn set(&mut self, key: &str, value: &Value) -> KvResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
