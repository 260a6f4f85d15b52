use std::sync::Arc;
use std::thread;
use tempfile::TempDir;
use vocab_core::exchange::{self, ImportMode, VocabularyBundle};
use vocab_core::{FileStore, KeyValueStore, MemoryStore, VocabularyManager};

const HISTORY: [&str; 4] = ["Ur", "Uruk", "Ur", "Eridu"];

#[test]
fn state_survives_restart_through_file_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vocabulary.bin");

    let before = {
        let manager = VocabularyManager::new(FileStore::open(&path).unwrap());
        manager.add_option("siteName", "Nippur");
        manager.add_option("siteName", "Lagash");
        manager.reorder("siteName", &["Lagash", "Eridu", "Nippur"]);
        manager.get_display_list("siteName", "", &HISTORY)
    };
    assert_eq!(before, ["Lagash", "Eridu", "Nippur", "Ur", "Uruk"]);

    let manager = VocabularyManager::new(FileStore::open(&path).unwrap());
    assert_eq!(manager.get_display_list("siteName", "", &HISTORY), before);
}

#[test]
fn serialized_state_reloads_into_identical_list() {
    let source = VocabularyManager::new(MemoryStore::new());
    source.add_option("material", "bone");
    source.add_option("material", "faience");
    source.reorder("material", &["bone", "faience", "carnelian"]);

    let copy = MemoryStore::new();
    for key in source.store().keys().unwrap() {
        copy.insert_raw(&key, &source.store().raw(&key).unwrap());
    }
    let reloaded = VocabularyManager::new(copy);

    let history = ["carnelian", "lapis", "lapis"];
    assert_eq!(
        reloaded.get_display_list("material", "", &history),
        source.get_display_list("material", "", &history)
    );
}

#[test]
fn order_round_trips_exactly_as_json() {
    let manager = VocabularyManager::new(MemoryStore::new());
    manager.reorder("finder", &["Woolley", "Mallowan", "Kenyon"]);
    let raw = manager.store().raw("custom_order_finder").unwrap();
    let decoded: Vec<String> = serde_json::from_str(&raw).unwrap();
    assert_eq!(decoded, ["Woolley", "Mallowan", "Kenyon"]);
}

#[test]
fn concurrent_adds_on_one_key_are_not_lost() {
    let manager = Arc::new(VocabularyManager::new(MemoryStore::new()));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                for i in 0..25 {
                    manager.add_option("context", &format!("ctx-{}-{}", t, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(manager.options("context").len(), 200);
    assert_eq!(manager.manual_order("context").len(), 200);

    manager.reload("context");
    assert_eq!(manager.get_display_list("context", "", &[] as &[&str]).len(), 200);
}

#[test]
fn export_file_imports_into_fresh_store() {
    let dir = TempDir::new().unwrap();
    let bundle_path = dir.path().join("vocab.json");

    let source = VocabularyManager::new(MemoryStore::new());
    source.add_option("material", "bone");
    source.add_option("siteName", "Ur");
    exchange::export_all(&source).write_file(&bundle_path).unwrap();

    let target = VocabularyManager::new(FileStore::open(dir.path().join("target.bin")).unwrap());
    let bundle = VocabularyBundle::read_file(&bundle_path).unwrap();
    assert_eq!(exchange::import(&target, &bundle, ImportMode::Replace).unwrap(), 2);
    assert_eq!(target.get_display_list("siteName", "", &HISTORY)[0], "Ur");
    assert!(target.options("material").contains("bone"));
}
