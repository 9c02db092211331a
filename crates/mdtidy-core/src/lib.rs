//! mdtidy Core Library
//!
//! Frontmatter parsing and normalization, title/heading reconciliation,
//! exam file classification and the batch runners built on them.
//! All disk access goes through the [`vfs::FileSystem`] seam.
//!

pub mod cache;
pub mod classify;
pub mod config;
pub mod encoding;
pub mod error;
pub mod heading;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod utils;
pub mod vfs;
pub mod workspace;

pub use cache::ExistenceCache;
pub use classify::{Classification, Classifier, Kind, Target};
pub use config::TidyConfig;
pub use error::{TidyError, TidyResult};
pub use model::Document;
pub use parser::{parse_document, render_document, ParsedDocument};
pub use utils::{normalize_relative_path, slug_from_filename};
pub use vfs::{FileSystem, PhysicalFileSystem};
pub use workspace::{
    CacheStrategy, DuplicatePolicy, Engine, FormatRun, OrganizeMode, OrganizeReport, OrganizeRun,
    OrganizeStats, RunReport, RunStats, TitleRun,
};
