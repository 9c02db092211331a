use super::*;
use crate::cache::{ExistenceCache, PersistentCache};
use crate::config::TidyConfig;
use crate::error::TidyError;
use crate::vfs::PhysicalFileSystem;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn exam(level: &str) -> String {
    format!("---\ncategories:\n- {}\ntitle: 真题\n---\n## 真题\n", level)
}

#[test]
fn test_build_and_lookup() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "1/codereal/a.md", "a");
    write(root, "2/practice/b.md", "b");
    write(root, "2/practice/notes.txt", "x");

    let fs = PhysicalFileSystem;
    let mut cache = ExistenceCache::build(&fs, root);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.lookup(&fs, "a.md"), Some(root.join("1/codereal/a.md")));
    assert_eq!(cache.lookup(&fs, "missing.md"), None);
}

#[test]
fn test_stale_entry_is_evicted_on_lookup() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "1/others/gone.md", "x");

    let fs = PhysicalFileSystem;
    let mut cache = ExistenceCache::build(&fs, root);
    fs::remove_file(root.join("1/others/gone.md")).unwrap();

    assert_eq!(cache.lookup(&fs, "gone.md"), None);
    assert!(cache.is_empty(), "stale entry should be dropped");
}

#[test]
fn test_record_and_evict() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let fs = PhysicalFileSystem;
    let mut cache = ExistenceCache::new(root);

    write(root, "3/syllabus/s.md", "s");
    cache.record("s.md", Path::new("3/syllabus/s.md"));
    assert_eq!(cache.lookup(&fs, "s.md"), Some(root.join("3/syllabus/s.md")));

    assert!(cache.evict("s.md"));
    assert!(!cache.evict("s.md"));
    assert_eq!(cache.lookup(&fs, "s.md"), None);
}

#[test]
fn test_cache_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "1/codereal/a.md", "a");
    let fs = PhysicalFileSystem;

    let cache_path = root.join("cache.json");
    ExistenceCache::build(&fs, root)
        .save(&fs, &cache_path)
        .expect("Failed to save cache");

    let mut loaded = ExistenceCache::load(&fs, &cache_path, root).expect("Failed to load cache");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.root(), root);
    assert_eq!(loaded.lookup(&fs, "a.md"), Some(root.join("1/codereal/a.md")));

    let raw: PersistentCache =
        serde_json::from_str(&fs::read_to_string(&cache_path).unwrap()).unwrap();
    assert_eq!(raw.version, PersistentCache::CURRENT_VERSION);
    assert_eq!(raw.entries["a.md"], "1/codereal/a.md");
}

#[test]
fn test_cache_version_mismatch() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let cache_path = root.join("cache.json");
    let stale = PersistentCache {
        version: PersistentCache::CURRENT_VERSION + 1,
        root: root.to_path_buf(),
        entries: Default::default(),
    };
    fs::write(&cache_path, serde_json::to_string(&stale).unwrap()).unwrap();

    let result = ExistenceCache::load(&PhysicalFileSystem, &cache_path, root);
    assert!(matches!(result, Err(TidyError::CacheVersion { .. })));
}

#[test]
fn test_cache_root_mismatch() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let fs = PhysicalFileSystem;
    let cache_path = root.join("cache.json");
    ExistenceCache::new(root.join("elsewhere"))
        .save(&fs, &cache_path)
        .unwrap();

    let result = ExistenceCache::load(&fs, &cache_path, root);
    assert!(matches!(result, Err(TidyError::CacheRootMismatch { .. })));
}

#[test]
fn test_organize_persists_cache_between_runs() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write(source.path(), "2024-01-01-gesp-a.md", &exam("一级"));
    write(source.path(), "2024-01-02-gesp-b.md", &exam("四级"));

    let engine = Engine::new(TidyConfig::default(), Arc::new(PhysicalFileSystem)).unwrap();
    let run = OrganizeRun {
        mode: OrganizeMode::Execute,
        cache: CacheStrategy::Persistent("cache.json".into()),
        ..OrganizeRun::new(source.path(), dest.path())
    };

    let first = engine.organize(&run).unwrap();
    assert_eq!(first.stats.copied, 2);

    let cache_path = dest.path().join("cache.json");
    let saved = ExistenceCache::load(&PhysicalFileSystem, &cache_path, dest.path()).unwrap();
    assert_eq!(saved.len(), 2);

    // A copy deleted behind the cache's back is copied again.
    fs::remove_file(dest.path().join("4/codereal/2024-01-02-gesp-b.md")).unwrap();
    let second = engine.organize(&run).unwrap();
    assert_eq!(second.stats.existed, 1);
    assert_eq!(second.stats.copied, 1);
    assert!(dest.path().join("4/codereal/2024-01-02-gesp-b.md").is_file());
}

#[test]
fn test_organize_rebuilds_unreadable_cache() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write(source.path(), "2024-01-01-gesp-a.md", &exam("一级"));
    write(dest.path(), "old/2024-01-01-gesp-a.md", "existing");
    fs::write(dest.path().join("cache.json"), "not json").unwrap();

    let engine = Engine::new(TidyConfig::default(), Arc::new(PhysicalFileSystem)).unwrap();
    let run = OrganizeRun {
        mode: OrganizeMode::Execute,
        cache: CacheStrategy::Persistent("cache.json".into()),
        ..OrganizeRun::new(source.path(), dest.path())
    };

    let report = engine.organize(&run).unwrap();
    assert_eq!(report.stats.existed, 1);
    assert_eq!(report.stats.copied, 0);

    let rebuilt =
        ExistenceCache::load(&PhysicalFileSystem, &dest.path().join("cache.json"), dest.path())
            .expect("cache should have been rewritten");
    assert_eq!(rebuilt.len(), 1);
}

#[test]
fn test_preview_does_not_write_cache() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write(source.path(), "2024-01-01-gesp-a.md", &exam("一级"));

    let engine = Engine::new(TidyConfig::default(), Arc::new(PhysicalFileSystem)).unwrap();
    let run = OrganizeRun {
        cache: CacheStrategy::Persistent("cache.json".into()),
        rebuild_cache: true,
        ..OrganizeRun::new(source.path(), dest.path())
    };

    let report = engine.organize(&run).unwrap();
    assert_eq!(report.stats.copied, 1);
    assert!(!dest.path().join("cache.json").exists());
}

#[test]
fn test_organize_keeps_file_added_after_cache_was_saved() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write(source.path(), "2024-01-01-gesp-a.md", &exam("一级"));

    let engine = Engine::new(TidyConfig::default(), Arc::new(PhysicalFileSystem)).unwrap();
    let run = OrganizeRun {
        mode: OrganizeMode::Execute,
        cache: CacheStrategy::Persistent("cache.json".into()),
        ..OrganizeRun::new(source.path(), dest.path())
    };
    assert_eq!(engine.organize(&run).unwrap().stats.copied, 1);

    // Placed by hand where the next copy would land; the saved cache knows nothing of it.
    write(source.path(), "2024-01-02-gesp-b.md", &exam("二级"));
    let manual = dest.path().join("2/codereal/2024-01-02-gesp-b.md");
    write(dest.path(), "2/codereal/2024-01-02-gesp-b.md", "MANUAL EDIT");

    let second = engine.organize(&run).unwrap();
    assert_eq!(second.stats.copied, 0);
    assert_eq!(second.stats.existed, 2);
    assert_eq!(fs::read_to_string(&manual).unwrap(), "MANUAL EDIT");

    let saved =
        ExistenceCache::load(&PhysicalFileSystem, &dest.path().join("cache.json"), dest.path())
            .unwrap();
    assert_eq!(saved.len(), 2, "the hand-placed file should now be cached");
}
