use serde_json::Value;
use studynote_core::{
    KvError, KvResult, KvStore, MemoryKvStore, NoteId, NoteStore, RawNoteData, SqliteKvStore,
    StoreConfig, StoreError, StudySession, Tag, TagId,
};

fn tag(id: &str, label: &str) -> Tag {
    Tag::with_id(TagId::new(id), label)
}

fn tagged(title: &str, tag_ids: &[&str]) -> RawNoteData {
    let mut data = RawNoteData::new(title, format!("# {title}"));
    data.tag_ids = tag_ids.iter().map(|id| TagId::new(*id)).collect();
    data
}

fn resolved_tag_ids(store: &NoteStore<MemoryKvStore>, id: &NoteId) -> Vec<String> {
    store
        .resolve_note(id)
        .unwrap()
        .tags
        .iter()
        .map(|tag| tag.id.as_str().to_string())
        .collect()
}

/// Backend whose writes fail once `fail_writes` is set.
#[derive(Default)]
struct FlakyKvStore {
    inner: MemoryKvStore,
    fail_writes: bool,
}

impl KvStore for FlakyKvStore {
    fn get(&self, key: &str) -> KvResult<Option<Value>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &Value) -> KvResult<()> {
        if self.fail_writes {
            let full = rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_FULL);
            return Err(KvError::from(rusqlite::Error::SqliteFailure(full, None)));
        }
        self.inner.set(key, value)
    }
}

#[test]
fn empty_store_bootstraps_single_welcome_note() {
    let store = NoteStore::load(MemoryKvStore::new()).unwrap();

    assert_eq!(store.notes().len(), 1);
    let welcome = &store.notes()[0];
    assert_eq!(welcome.title, "Welcome!");
    assert!(welcome.tag_ids.is_empty());
    assert_eq!(welcome.sessions, Some(Vec::new()));
    assert!(store.tags().is_empty());

    let persisted = store.kv().get("NOTES").unwrap().unwrap();
    assert_eq!(persisted[0]["id"], "welcome-note");
    assert_eq!(persisted[0]["sessions"], serde_json::json!([]));
}

#[test]
fn existing_notes_are_not_reseeded() {
    let mut kv = MemoryKvStore::new();
    kv.insert_raw(
        "NOTES",
        r#"[{"id":"n-1","title":"mine","markdown":"","tagIds":[]}]"#,
    );

    let store = NoteStore::load(kv).unwrap();
    assert_eq!(store.notes().len(), 1);
    assert_eq!(store.notes()[0].id.as_str(), "n-1");
}

#[test]
fn seeding_can_be_disabled() {
    let config = StoreConfig {
        seed_welcome_note: false,
        ..StoreConfig::default()
    };
    let store = NoteStore::load_with_config(MemoryKvStore::new(), config).unwrap();
    assert!(store.notes().is_empty());
    assert!(store.kv().is_empty());
}

#[test]
fn create_update_delete_note_lifecycle() {
    let mut store = NoteStore::load(MemoryKvStore::new()).unwrap();
    let id = store.create_note(RawNoteData::new("", "")).unwrap();
    assert_eq!(store.notes().len(), 2);
    assert_eq!(store.note(&id).unwrap().title, "");

    assert!(store.update_note(&id, tagged("Renamed", &["t1"])).unwrap());
    let updated = store.note(&id).unwrap();
    assert_eq!(updated.id, id);
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.tag_ids, vec![TagId::new("t1")]);

    assert!(store.delete_note(&id).unwrap());
    assert!(store.note(&id).is_none());
    assert!(!store.delete_note(&id).unwrap());
    assert_eq!(store.notes().len(), 1);
}

#[test]
fn created_note_ids_are_unique() {
    let mut store = NoteStore::load(MemoryKvStore::new()).unwrap();
    let first = store.create_note(RawNoteData::new("a", "")).unwrap();
    let second = store.create_note(RawNoteData::new("a", "")).unwrap();
    assert_ne!(first, second);
}

#[test]
fn resolution_tracks_current_tags_and_drops_dangling_ids() {
    let mut store = NoteStore::load(MemoryKvStore::new()).unwrap();
    store.create_tag(tag("math", "Math")).unwrap();
    store.create_tag(tag("exam", "Exam")).unwrap();
    let id = store
        .create_note(tagged("calc", &["exam", "ghost", "math", "exam"]))
        .unwrap();

    assert_eq!(resolved_tag_ids(&store, &id), vec!["exam", "math"]);

    store.update_tag(&TagId::new("math"), "Mathematics").unwrap();
    let note = store.resolve_note(&id).unwrap();
    assert_eq!(note.tags[1].label, "Mathematics");
}

#[test]
fn deleting_tag_leaves_notes_untouched() {
    let mut store = NoteStore::load(MemoryKvStore::new()).unwrap();
    store.create_tag(tag("a", "A")).unwrap();
    store.create_tag(tag("b", "B")).unwrap();
    let first = store.create_note(tagged("first", &["a", "b"])).unwrap();
    let second = store.create_note(tagged("second", &["a"])).unwrap();
    let raw_before = store.notes().to_vec();

    assert!(store.delete_tag(&TagId::new("a")).unwrap());

    assert_eq!(store.notes(), raw_before.as_slice());
    assert_eq!(resolved_tag_ids(&store, &first), vec!["b"]);
    assert!(resolved_tag_ids(&store, &second).is_empty());
    assert_eq!(store.resolve_notes().len(), 3);
    assert!(!store.delete_tag(&TagId::new("a")).unwrap());
}

#[test]
fn persistence_failure_aborts_mutation_without_changing_state() {
    let store = NoteStore::load(FlakyKvStore::default()).unwrap();
    let before = store.notes().to_vec();

    let mut failing = store.into_kv();
    failing.fail_writes = true;
    let mut store = NoteStore::load(failing).unwrap();

    let err = store.create_note(RawNoteData::new("lost", "")).unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));
    assert_eq!(store.notes(), before.as_slice());

    let err = store.create_tag(tag("x", "X")).unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));
    assert!(store.tags().is_empty());
}

#[test]
fn malformed_persisted_json_fails_load() {
    let mut kv = MemoryKvStore::new();
    kv.insert_raw("TAGS", "{not json");
    let err = NoteStore::load(kv).err().unwrap();
    assert!(matches!(err, StoreError::Persistence(KvError::Json { .. })));

    let mut kv = MemoryKvStore::new();
    kv.insert_raw("TAGS", r#"{"id":"object-not-array"}"#);
    let err = NoteStore::load(kv).err().unwrap();
    assert!(matches!(err, StoreError::Decode { ref key, .. } if key == "TAGS"));
}

#[test]
fn sqlite_reload_reproduces_lists_field_for_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    let (notes_before, tags_before) = {
        let mut store = NoteStore::load(SqliteKvStore::open(&path).unwrap()).unwrap();
        store.create_tag(tag("t1", "Physics")).unwrap();

        let mut with_history = tagged("mechanics", &["t1", "deleted-tag"]);
        with_history.sessions = Some(vec![
            StudySession {
                start: "2024-02-01T09:00:00.000Z".to_string(),
                end: "2024-02-01T09:45:00.000Z".to_string(),
            },
            StudySession {
                start: "not-a-date".to_string(),
                end: "2024-02-01T10:00:00.000Z".to_string(),
            },
        ]);
        store.create_note(with_history).unwrap();
        store.create_note(tagged("no history yet", &[])).unwrap();

        (store.notes().to_vec(), store.tags().to_vec())
    };

    let reloaded = NoteStore::load(SqliteKvStore::open(&path).unwrap()).unwrap();
    assert_eq!(reloaded.notes(), notes_before.as_slice());
    assert_eq!(reloaded.tags(), tags_before.as_slice());
    assert!(reloaded.notes()[2].sessions.is_none());
}

#[test]
fn custom_keys_isolate_notebooks_in_one_backend() {
    let mut kv = MemoryKvStore::new();
    {
        let mut store =
            NoteStore::load_with_config(&mut kv, StoreConfig::with_key_prefix("a")).unwrap();
        store.create_note(RawNoteData::new("only in a", "")).unwrap();
    }

    let other = NoteStore::load_with_config(&mut kv, StoreConfig::with_key_prefix("b")).unwrap();
    assert_eq!(other.notes().len(), 1);
    assert_eq!(other.notes()[0].title, "Welcome!");
    assert!(kv.raw("a:NOTES").unwrap().contains("only in a"));
}
