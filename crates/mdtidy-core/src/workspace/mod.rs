//! Batch runners over a content tree.
//!
//! Every run takes an explicit run config, walks the filesystem through
//! [`FileSystem`](crate::vfs::FileSystem) and returns a report by value.
//! Per-file problems are logged and counted; only setup failures (missing
//! directory, bad configuration) abort a run.

use serde::Serialize;
use std::path::PathBuf;

mod engine;
mod file_ops;
mod formatter;
mod organizer;
mod titles;

#[cfg(test)]
mod cache_tests;

pub use engine::Engine;
pub use formatter::FormatRun;
pub use organizer::{
    CacheStrategy, DuplicatePolicy, ExistingCopy, OrganizeMode, OrganizeReport, OrganizeRun,
    OrganizeStats, PlannedCopy,
};
pub use titles::TitleRun;

/// Counters for the in-place passes.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub processed: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Result of an in-place pass. In a dry run `changed` lists the files that
/// would have been written.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunReport {
    pub stats: RunStats,
    pub changed: Vec<PathBuf>,
}
