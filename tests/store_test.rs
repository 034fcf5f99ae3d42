use chrono::{TimeZone, Utc};
use mailview::*;
use std::fs;

struct BrokenStore;

impl MessageStore for BrokenStore {
    fn list(&self) -> Result<Vec<StoredMessage>> {
        Ok(vec![StoredMessage {
            id: "lost".into(),
            size: 0,
            last_modified: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }])
    }

    fn fetch(&self, id: &str) -> Result<Vec<u8>> {
        Err(MailError::NotFound(id.to_string()))
    }
}

fn dir_store() -> (tempfile::TempDir, DirStore) {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("a.eml"), b"Subject: A\r\n\r\nfirst").unwrap();
    fs::write(tmp.path().join("b.eml"), b"Subject: B\r\n\r\nsecond").unwrap();
    fs::write(tmp.path().join("notes.txt"), b"not a message").unwrap();
    fs::create_dir(tmp.path().join("sub.eml")).unwrap();

    let config = StoreConfig::new(tmp.path()).with_extension("eml");
    let store = DirStore::new(config).unwrap();
    (tmp, store)
}

// --- Config ---

#[test]
fn test_config_from_toml() {
    let config = StoreConfig::from_toml_str("root = \"/var/mail/raw\"\nextension = \"eml\"\n").unwrap();

    assert_eq!(config.root, std::path::PathBuf::from("/var/mail/raw"));
    assert_eq!(config.extension.as_deref(), Some("eml"));
}

#[test]
fn test_config_defaults() {
    let config = StoreConfig::from_toml_str("").unwrap();

    assert_eq!(config, StoreConfig::default());
    assert!(config.extension.is_none());
}

#[test]
fn test_config_invalid_toml() {
    assert!(matches!(
        StoreConfig::from_toml_str("root = ["),
        Err(MailError::Config(_))
    ));
}

#[test]
fn test_config_load_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("store.toml");
    fs::write(&path, "root = \"messages\"\n").unwrap();

    let config = StoreConfig::load(&path).unwrap();
    assert_eq!(config.root, std::path::PathBuf::from("messages"));

    assert!(matches!(
        StoreConfig::load(&tmp.path().join("missing.toml")),
        Err(MailError::Io { .. })
    ));
}

// --- DirStore ---

#[test]
fn test_dir_store_requires_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(tmp.path().join("nope"));

    assert!(matches!(DirStore::new(config), Err(MailError::Config(_))));
}

#[test]
fn test_dir_store_list_filters_extension() {
    let (_tmp, store) = dir_store();
    let ids: Vec<String> = store.list().unwrap().into_iter().map(|m| m.id).collect();

    assert_eq!(ids, vec!["a.eml", "b.eml"]);
}

#[test]
fn test_dir_store_list_all_files() {
    let (tmp, _store) = dir_store();
    let store = DirStore::new(StoreConfig::new(tmp.path())).unwrap();
    let listed = store.list().unwrap();

    assert_eq!(listed.len(), 3);
    let notes = listed.iter().find(|m| m.id == "notes.txt").unwrap();
    assert_eq!(notes.size, 13);
}

#[test]
fn test_dir_store_fetch() {
    let (_tmp, store) = dir_store();

    assert_eq!(store.fetch("a.eml").unwrap(), b"Subject: A\r\n\r\nfirst");
    assert!(matches!(store.fetch("zzz.eml"), Err(MailError::NotFound(_))));
}

#[test]
fn test_dir_store_rejects_traversal() {
    let (_tmp, store) = dir_store();

    for id in ["../secret", "..", "a/b.eml", "a\\b.eml", ""] {
        assert!(
            matches!(store.fetch(id), Err(MailError::InvalidId(_))),
            "{id:?} should be rejected"
        );
    }
}

#[test]
fn test_dir_store_feeds_extract() {
    let (_tmp, store) = dir_store();
    let email = extract(&store.fetch("b.eml").unwrap());

    assert_eq!(email.subject.as_deref(), Some("B"));
    assert_eq!(email.body.content, "second");
}

// --- Summaries ---

#[test]
fn test_summarize_newest_first_with_defaults() {
    let mut store = MemoryStore::new();
    store.insert(
        "old",
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        b"To: Ops <ops@example.com>\r\nSubject: Old news\r\n\r\nx".to_vec(),
    );
    store.insert(
        "new",
        Utc.with_ymd_and_hms(2025, 2, 3, 9, 30, 0).unwrap(),
        b"garbage".to_vec(),
    );

    let summaries = summarize(&store).unwrap();

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].id, "new");
    assert_eq!(summaries[0].to, UNKNOWN_RECIPIENT);
    assert_eq!(summaries[0].subject, NO_SUBJECT);
    assert_eq!(summaries[1].id, "old");
    assert_eq!(summaries[1].to, "ops@example.com");
    assert_eq!(summaries[1].subject, "Old news");
}

#[test]
fn test_summarize_unreadable_message() {
    let summaries = summarize(&BrokenStore).unwrap();

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].to, READ_ERROR);
    assert_eq!(summaries[0].subject, READ_ERROR);
}

#[test]
fn test_memory_store_fetch() {
    let mut store = MemoryStore::new();
    store.insert("m1", Utc::now(), b"raw".to_vec());

    assert_eq!(store.fetch("m1").unwrap(), b"raw");
    assert_eq!(store.list().unwrap()[0].size, 3);
    assert!(matches!(store.fetch("m2"), Err(MailError::NotFound(_))));
}

#[test]
fn test_summarize_through_trait_object() {
    let mut store = MemoryStore::new();
    store.insert("only", Utc::now(), b"Subject: Dyn\r\n\r\nx".to_vec());
    let store: &dyn MessageStore = &store;

    assert_eq!(summarize(store).unwrap()[0].subject, "Dyn");
}
