use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{TidyError, TidyResult};
use crate::utils::{file_name_of, normalize_relative_path};
use crate::vfs::FileSystem;

/// On-disk form of [`ExistenceCache`].
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PersistentCache {
    pub version: u32,
    pub root: PathBuf,
    pub entries: BTreeMap<String, String>,
}

impl PersistentCache {
    pub const CURRENT_VERSION: u32 = 1;
}

/// File name to destination-relative path, for duplicate detection.
///
/// Never authoritative: every hit is checked against the filesystem and
/// stale entries are dropped on the spot.
#[derive(Debug, Clone)]
pub struct ExistenceCache {
    root: PathBuf,
    entries: BTreeMap<String, String>,
}

impl ExistenceCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Walk every Markdown file under `root`. When a name occurs more than
    /// once, the first path in walk order is kept.
    pub fn build(fs: &dyn FileSystem, root: &Path) -> Self {
        let mut cache = Self::new(root);
        for path in fs.list_files(root, "md", true) {
            let name = file_name_of(&path);
            if cache.entries.contains_key(&name) {
                continue;
            }
            let relative = path.strip_prefix(root).unwrap_or(&path);
            cache
                .entries
                .insert(name, normalize_relative_path(relative));
        }
        log::debug!("Cache built for {:?}: {} entries", root, cache.entries.len());
        cache
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Absolute path of an existing file with this name, if known.
    pub fn lookup(&mut self, fs: &dyn FileSystem, name: &str) -> Option<PathBuf> {
        let relative = self.entries.get(name)?;
        let path = self.root.join(relative);
        if fs.exists(&path) {
            return Some(path);
        }
        log::debug!("Evicting stale cache entry {} -> {}", name, relative);
        self.entries.remove(name);
        None
    }

    pub fn record(&mut self, name: impl Into<String>, relative: &Path) {
        self.entries
            .insert(name.into(), normalize_relative_path(relative));
    }

    pub fn evict(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn load(fs: &dyn FileSystem, path: &Path, root: &Path) -> TidyResult<Self> {
        let buffer = fs.read_bytes(path).map_err(|e| TidyError::io(path, e))?;
        let state: PersistentCache = serde_json::from_slice(&buffer)?;

        if state.version != PersistentCache::CURRENT_VERSION {
            return Err(TidyError::CacheVersion {
                found: state.version,
                expected: PersistentCache::CURRENT_VERSION,
            });
        }
        if state.root != root {
            return Err(TidyError::CacheRootMismatch {
                found: state.root,
                expected: root.to_path_buf(),
            });
        }

        Ok(Self {
            root: state.root,
            entries: state.entries,
        })
    }

    pub fn save(&self, fs: &dyn FileSystem, path: &Path) -> TidyResult<()> {
        let state = PersistentCache {
            version: PersistentCache::CURRENT_VERSION,
            root: self.root.clone(),
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&state)?;
        fs.write_string(path, &json)
            .map_err(|e| TidyError::io(path, e))
    }
}
