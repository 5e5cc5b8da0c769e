//! `kv_entries` schema versioning for the SQLite backend.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - Step `n` (1-based) lifts a file from version `n - 1` to `n`.
//! - All pending steps run in one transaction.

use super::{KvError, KvResult};
use log::info;
use rusqlite::Connection;

const SCHEMA_STEPS: &[&str] = &[include_str!("sql/0001_kv_entries.sql")];

/// Schema version this build reads and writes.
pub const SCHEMA_VERSION: u32 = SCHEMA_STEPS.len() as u32;

/// Schema versions seen when a connection was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaUpgrade {
    pub from: u32,
    pub to: u32,
}

impl SchemaUpgrade {
    /// Whether any step ran.
    pub fn applied(&self) -> bool {
        self.from != self.to
    }
}

/// Reads the stored schema version.
pub fn stored_version(conn: &Connection) -> KvResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Runs every step above the stored version.
///
/// # Errors
/// - `KvError::UnsupportedSchemaVersion` when the file was written by a newer
///   build; nothing is touched in that case.
pub fn upgrade_schema(conn: &mut Connection) -> KvResult<SchemaUpgrade> {
    let from = stored_version(conn)?;
    if from > SCHEMA_VERSION {
        return Err(KvError::UnsupportedSchemaVersion {
            found: from,
            supported: SCHEMA_VERSION,
        });
    }

    let upgrade = SchemaUpgrade {
        from,
        to: SCHEMA_VERSION,
    };
    if !upgrade.applied() {
        return Ok(upgrade);
    }

    let tx = conn.transaction()?;
    for (index, sql) in SCHEMA_STEPS.iter().enumerate().skip(from as usize) {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", index as u32 + 1)?;
    }
    tx.commit()?;

    info!(
        "event=kv_schema_upgrade module=kv status=ok from_version={} to_version={}",
        upgrade.from, upgrade.to
    );
    Ok(upgrade)
}
