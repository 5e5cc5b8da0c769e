//! SQLite-backed durable key-value store.
//!
//! # Invariants
//! - One row per key in `kv_entries`; `set` is an upsert.
//! - `open*` upgrade the schema before the first read or write.
//! - Every open attempt emits one `kv_open` start event and one ok/error event.

use super::schema::{stored_version, upgrade_schema, SchemaUpgrade};
use super::{parse_document, KvError, KvResult, KvStore};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::time::{Duration, Instant};

const KV_TABLE: &str = "kv_entries";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Key-value store persisting JSON documents in SQLite.
pub struct SqliteKvStore {
    conn: Connection,
    schema: SchemaUpgrade,
}

impl SqliteKvStore {
    /// Wraps a connection whose schema is already current.
    pub fn try_new(conn: Connection) -> KvResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [KV_TABLE],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(KvError::MissingRequiredTable(KV_TABLE));
        }
        let version = stored_version(&conn)?;
        Ok(Self {
            conn,
            schema: SchemaUpgrade {
                from: version,
                to: version,
            },
        })
    }

    /// Opens a database file, creating and upgrading it when needed.
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        let path = path.as_ref();
        Self::open_with("file", || Connection::open(path))
    }

    /// Opens a process-lifetime database.
    pub fn open_in_memory() -> KvResult<Self> {
        Self::open_with("memory", Connection::open_in_memory)
    }

    /// Schema versions before and after this store was opened.
    pub fn schema(&self) -> SchemaUpgrade {
        self.schema
    }

    /// Returns stored keys in ascending order.
    pub fn keys(&self) -> KvResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_entries ORDER BY key ASC;")?;
        let mut rows = stmt.query([])?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next()? {
            keys.push(row.get(0)?);
        }
        Ok(keys)
    }

    /// Gives back the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn open_with(
        mode: &'static str,
        connect: impl FnOnce() -> rusqlite::Result<Connection>,
    ) -> KvResult<Self> {
        let started_at = Instant::now();
        info!("event=kv_open module=kv status=start backend=sqlite mode={mode}");

        let opened = connect().map_err(KvError::from).and_then(|mut conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            let schema = upgrade_schema(&mut conn)?;
            Ok(Self { conn, schema })
        });

        match &opened {
            Ok(store) => info!(
                "event=kv_open module=kv status=ok backend=sqlite mode={} schema_from={} schema_to={} duration_ms={}",
                mode,
                store.schema.from,
                store.schema.to,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=kv_open module=kv status=error backend=sqlite mode={} duration_ms={} error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        opened
    }
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &str) -> KvResult<Option<Value>> {
        let text: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;

        text.map(|text| parse_document(key, &text)).transpose()
    }

    fn set(&mut self, key: &str, value: &Value) -> KvResult<()> {
        let text = value.to_string();
        self.conn
            .execute(
                "INSERT INTO kv_entries (key, value)
                 VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
                params![key, text],
            )
            .map_err(|err| {
                error!(
                    "event=kv_set module=kv status=error backend=sqlite key={} bytes={} error={}",
                    key,
                    text.len(),
                    err
                );
                KvError::from(err)
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteKvStore;
    use crate::kv::{KvError, KvStore, SCHEMA_VERSION};
    use rusqlite::Connection;
    use serde_json::json;

    #[test]
    fn set_then_get_roundtrips_document() {
        let mut store = SqliteKvStore::open_in_memory().expect("open in-memory store");
        store
            .set("NOTES", &json!([{ "id": "a" }]))
            .expect("first write");
        store
            .set("NOTES", &json!([{ "id": "b" }]))
            .expect("overwrite");

        assert_eq!(
            store.get("NOTES").expect("read back"),
            Some(json!([{ "id": "b" }]))
        );
        assert_eq!(store.keys().expect("list keys"), vec!["NOTES".to_string()]);
        assert!(store.get("TAGS").expect("read missing").is_none());
    }

    #[test]
    fn open_reports_schema_upgrade() {
        let store = SqliteKvStore::open_in_memory().expect("open in-memory store");
        assert_eq!(store.schema().from, 0);
        assert_eq!(store.schema().to, SCHEMA_VERSION);

        let rewrapped =
            SqliteKvStore::try_new(store.into_connection()).expect("current schema wraps");
        assert!(!rewrapped.schema().applied());
        assert_eq!(rewrapped.schema().to, SCHEMA_VERSION);
    }

    #[test]
    fn try_new_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().expect("in-memory sqlite");
        let err = SqliteKvStore::try_new(conn)
            .err()
            .expect("bare connection must be rejected");
        assert!(matches!(err, KvError::MissingRequiredTable("kv_entries")));
    }

    #[test]
    fn corrupt_row_surfaces_json_error() {
        let store = SqliteKvStore::open_in_memory().expect("open in-memory store");
        let conn = store.into_connection();
        conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES ('TAGS', 'not json');",
            [],
        )
        .expect("seed corrupt row");

        let store = SqliteKvStore::try_new(conn).expect("rewrap connection");
        assert!(matches!(store.get("TAGS"), Err(KvError::Json { .. })));
    }
}
