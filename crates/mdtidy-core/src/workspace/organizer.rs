use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use super::Engine;
use crate::cache::ExistenceCache;
use crate::classify::{Classification, Target};
use crate::encoding::decode_text;
use crate::error::{TidyError, TidyResult};
use crate::parser::{content_digest, parse_document, ParsedDocument};
use crate::utils::file_name_of;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizeMode {
    /// Decide everything, copy nothing
    #[default]
    Preview,
    Execute,
}

/// How existing destination files are found.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CacheStrategy {
    /// Walk the destination for every file
    Off,
    #[default]
    Memory,
    /// JSON side file; relative paths are taken from the destination root
    Persistent(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// A file with the same name anywhere under the destination is a duplicate
    #[default]
    ByName,
    /// Same name and same content is a duplicate; a differing copy is refreshed
    ByContent,
}

#[derive(Debug, Clone)]
pub struct OrganizeRun {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub mode: OrganizeMode,
    pub cache: CacheStrategy,
    pub rebuild_cache: bool,
    pub duplicates: DuplicatePolicy,
}

impl OrganizeRun {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            mode: OrganizeMode::Preview,
            cache: CacheStrategy::Memory,
            rebuild_cache: false,
            duplicates: DuplicatePolicy::ByName,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizeStats {
    pub processed: usize,
    pub copied: usize,
    pub existed: usize,
    pub refreshed: usize,
    pub skipped: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub target: Target,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExistingCopy {
    pub source: PathBuf,
    pub existing: PathBuf,
    /// Set when content was compared: `false` means the copy was (or would be) refreshed
    pub identical: Option<bool>,
}

/// Outcome of [`Engine::organize`]. In preview mode the counters and lists
/// describe what an execution would do.
#[derive(Debug, Default, Clone, Serialize)]
pub struct OrganizeReport {
    pub stats: OrganizeStats,
    pub planned: Vec<PlannedCopy>,
    pub existing: Vec<ExistingCopy>,
    /// Destination directories that received (or would receive) files
    pub copied_dirs: BTreeSet<PathBuf>,
}

/// Where a name already lives, and which file holds the content to compare.
/// They differ only for files planned earlier in a preview run.
struct Existing {
    path: PathBuf,
    content: PathBuf,
}

enum Lookup {
    Walk,
    Cached(ExistenceCache),
}

struct Organizer<'a> {
    engine: &'a Engine,
    run: &'a OrganizeRun,
    lookup: Lookup,
    /// Names claimed earlier in this run, mapped to (destination, source)
    claimed: HashMap<String, (PathBuf, PathBuf)>,
    report: OrganizeReport,
}

impl Engine {
    /// Classify exam documents under `run.source` and copy them into
    /// `<destination>/<level>/<kind>/`, skipping names that already exist.
    pub fn organize(&self, run: &OrganizeRun) -> TidyResult<OrganizeReport> {
        self.ensure_dir(&run.source)?;
        if run.mode == OrganizeMode::Execute {
            self.fs
                .create_dir_all(&run.destination)
                .map_err(|e| TidyError::io(&run.destination, e))?;
        }

        let mut organizer = Organizer {
            engine: self,
            run,
            lookup: self.open_lookup(run),
            claimed: HashMap::new(),
            report: OrganizeReport::default(),
        };

        for path in self.fs.list_files(&run.source, "md", true) {
            if path.starts_with(&run.destination) {
                continue;
            }
            organizer.process(&path);
        }

        let report = organizer.finish()?;
        let stats = &report.stats;
        log::info!(
            "Organized {:?} -> {:?}: {} processed, {} copied, {} existed, {} refreshed, {} skipped, {} errors",
            run.source,
            run.destination,
            stats.processed,
            stats.copied,
            stats.existed,
            stats.refreshed,
            stats.skipped,
            stats.errors
        );
        Ok(report)
    }

    fn open_lookup(&self, run: &OrganizeRun) -> Lookup {
        let fs = &*self.fs;
        match &run.cache {
            CacheStrategy::Off => Lookup::Walk,
            CacheStrategy::Memory => {
                Lookup::Cached(ExistenceCache::build(fs, &run.destination))
            }
            CacheStrategy::Persistent(file) => {
                let file = cache_file_path(&run.destination, file);
                if run.rebuild_cache || !fs.exists(&file) {
                    return Lookup::Cached(ExistenceCache::build(fs, &run.destination));
                }
                match ExistenceCache::load(fs, &file, &run.destination) {
                    Ok(cache) => {
                        log::info!("Loaded {} cache entries from {:?}", cache.len(), file);
                        Lookup::Cached(cache)
                    }
                    Err(e) => {
                        log::warn!("Discarding cache {:?}: {}; rebuilding", file, e);
                        Lookup::Cached(ExistenceCache::build(fs, &run.destination))
                    }
                }
            }
        }
    }
}

fn cache_file_path(destination: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        destination.join(file)
    }
}

impl Organizer<'_> {
    fn process(&mut self, path: &Path) {
        self.report.stats.processed += 1;
        let file_name = file_name_of(path);
        let classifier = &self.engine.classifier;

        if !classifier.is_exam_file(&file_name) {
            log::debug!("Skipping non-exam file {:?}", path);
            self.report.stats.skipped += 1;
            return;
        }

        let bytes = match self.engine.fs.read_bytes(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("Failed to read {:?}: {}", path, e);
                self.report.stats.errors += 1;
                return;
            }
        };
        let decoded = decode_text(&bytes);
        let doc = match parse_document(&decoded.text) {
            ParsedDocument::Parsed(doc) => doc,
            ParsedDocument::Unparsed(reason) => {
                log::warn!("Skipping {:?}: {}", path, reason);
                self.report.stats.skipped += 1;
                return;
            }
        };

        let target = match classifier.classify(&doc, &file_name) {
            Classification::Target(target) => target,
            Classification::NotExamFile | Classification::Unclassifiable => {
                log::warn!("Skipping {:?}: no exam level in categories", path);
                self.report.stats.skipped += 1;
                return;
            }
        };

        if let Some(existing) = self.find_existing(&file_name) {
            self.handle_existing(path, &bytes, existing);
            return;
        }

        let relative = Path::new(&target.relative_dir()).join(&file_name);
        let destination = self.run.destination.join(&relative);
        // The cache may predate files placed by hand; the disk has the final say.
        if self.engine.fs.exists(&destination) {
            log::debug!("{:?} is on disk but was not cached", destination);
            if let Lookup::Cached(cache) = &mut self.lookup {
                cache.record(&file_name, &relative);
            }
            let existing = Existing {
                content: destination.clone(),
                path: destination,
            };
            self.handle_existing(path, &bytes, existing);
            return;
        }

        self.copy_new(path, &file_name, target, relative, destination);
    }

    fn find_existing(&mut self, file_name: &str) -> Option<Existing> {
        if let Some((destination, source)) = self.claimed.get(file_name) {
            let content = match self.run.mode {
                OrganizeMode::Preview => source.clone(),
                OrganizeMode::Execute => destination.clone(),
            };
            return Some(Existing {
                path: destination.clone(),
                content,
            });
        }

        let fs = &*self.engine.fs;
        let found = match &mut self.lookup {
            Lookup::Cached(cache) => cache.lookup(fs, file_name),
            Lookup::Walk => fs
                .list_files(&self.run.destination, "md", true)
                .into_iter()
                .find(|p| file_name_of(p) == file_name),
        };
        found.map(|path| Existing {
            content: path.clone(),
            path,
        })
    }

    fn handle_existing(&mut self, source: &Path, source_bytes: &[u8], existing: Existing) {
        if self.run.duplicates == DuplicatePolicy::ByName {
            log::info!("{:?} already exists at {:?}", source, existing.path);
            self.report.stats.existed += 1;
            self.report.existing.push(ExistingCopy {
                source: source.to_path_buf(),
                existing: existing.path,
                identical: None,
            });
            return;
        }

        let existing_bytes = match self.engine.fs.read_bytes(&existing.content) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("Failed to read {:?}: {}", existing.content, e);
                self.report.stats.errors += 1;
                return;
            }
        };
        let identical = content_digest(&existing_bytes) == content_digest(source_bytes);

        if identical {
            log::info!("{:?} already exists at {:?}", source, existing.path);
            self.report.stats.existed += 1;
        } else {
            if self.run.mode == OrganizeMode::Execute {
                if let Err(e) = self.engine.fs.copy_preserving(source, &existing.path) {
                    log::error!("Failed to refresh {:?}: {}", existing.path, e);
                    self.report.stats.errors += 1;
                    return;
                }
                log::info!("Refreshed {:?} from {:?}", existing.path, source);
            }
            self.report.stats.refreshed += 1;
            if let Some(dir) = existing.path.parent() {
                self.report.copied_dirs.insert(dir.to_path_buf());
            }
        }

        self.report.existing.push(ExistingCopy {
            source: source.to_path_buf(),
            existing: existing.path,
            identical: Some(identical),
        });
    }

    fn copy_new(
        &mut self,
        source: &Path,
        file_name: &str,
        target: Target,
        relative: PathBuf,
        destination: PathBuf,
    ) {
        if self.run.mode == OrganizeMode::Execute {
            if let Err(e) = self.engine.fs.copy_preserving(source, &destination) {
                log::error!("Failed to copy {:?} to {:?}: {}", source, destination, e);
                self.report.stats.errors += 1;
                return;
            }
            log::info!("Copied {:?} -> {}", source, relative.display());
            if let Lookup::Cached(cache) = &mut self.lookup {
                cache.record(file_name, &relative);
            }
        }

        self.claimed.insert(
            file_name.to_string(),
            (destination.clone(), source.to_path_buf()),
        );
        if let Some(dir) = destination.parent() {
            self.report.copied_dirs.insert(dir.to_path_buf());
        }
        self.report.stats.copied += 1;
        self.report.planned.push(PlannedCopy {
            source: source.to_path_buf(),
            destination,
            target,
        });
    }

    fn finish(self) -> TidyResult<OrganizeReport> {
        if self.run.mode == OrganizeMode::Execute {
            if let (CacheStrategy::Persistent(file), Lookup::Cached(cache)) =
                (&self.run.cache, &self.lookup)
            {
                let file = cache_file_path(&self.run.destination, file);
                cache.save(&*self.engine.fs, &file)?;
                log::debug!("Saved {} cache entries to {:?}", cache.len(), file);
            }
        }
        Ok(self.report)
    }
}
