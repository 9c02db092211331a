use std::path::{Path, PathBuf};

use super::{Engine, RunReport};
use crate::encoding::{decode_text, encode_text, TextEncoding};
use crate::error::{TidyError, TidyResult};
use crate::model::Document;
use crate::parser::{parse_document, render_document, LineEnding, ParsedDocument};
use crate::utils::is_underscore_file;

/// A document read for an in-place rewrite, with the text it was parsed from
/// and the encoding and line endings to write it back with.
pub(crate) struct LoadedDocument {
    pub original: String,
    pub encoding: TextEncoding,
    pub line_ending: LineEnding,
    pub doc: Document,
}

/// Shared plumbing for the in-place passes.
/// Reading counts skips and errors into the report; writing is gated on
/// `dry_run` and only happens when the rendered text differs.
impl Engine {
    pub(crate) fn ensure_dir(&self, dir: &Path) -> TidyResult<()> {
        if self.fs.is_dir(dir) {
            Ok(())
        } else {
            Err(TidyError::NotADirectory(dir.to_path_buf()))
        }
    }

    pub(crate) fn list_markdown(&self, root: &Path, recursive: bool) -> Vec<PathBuf> {
        let skip_underscore = self.config.frontmatter.skip_underscore_files;
        self.fs
            .list_files(root, "md", recursive)
            .into_iter()
            .filter(|path| !(skip_underscore && is_underscore_file(path)))
            .collect()
    }

    pub(crate) fn load_for_rewrite(
        &self,
        path: &Path,
        report: &mut RunReport,
    ) -> Option<LoadedDocument> {
        let bytes = match self.fs.read_bytes(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("Failed to read {:?}: {}", path, e);
                report.stats.errors += 1;
                return None;
            }
        };

        let decoded = decode_text(&bytes);
        if decoded.is_lossy() {
            log::warn!("Skipping {:?}: not valid UTF-8 or UTF-16", path);
            report.stats.skipped += 1;
            return None;
        }

        match parse_document(&decoded.text) {
            ParsedDocument::Parsed(doc) => Some(LoadedDocument {
                line_ending: LineEnding::detect(&decoded.text),
                encoding: decoded.encoding,
                original: decoded.text,
                doc,
            }),
            ParsedDocument::Unparsed(reason) => {
                log::warn!("Skipping {:?}: {}", path, reason);
                report.stats.skipped += 1;
                None
            }
        }
    }

    /// Render the document and write it if it differs from what was read.
    /// Returns whether the file changed (or would have, in a dry run).
    pub(crate) fn store_document(
        &self,
        path: &Path,
        loaded: &LoadedDocument,
        dry_run: bool,
        report: &mut RunReport,
    ) -> bool {
        let rendered = match render_document(&loaded.doc) {
            Ok(text) => loaded.line_ending.apply(text),
            Err(e) => {
                log::error!("Failed to render frontmatter for {:?}: {}", path, e);
                report.stats.errors += 1;
                return false;
            }
        };
        if rendered == loaded.original {
            return false;
        }

        if dry_run {
            log::info!("Would update {:?}", path);
        } else if let Err(e) = self
            .fs
            .write_bytes(path, &encode_text(&rendered, loaded.encoding))
        {
            log::error!("Failed to write {:?}: {}", path, e);
            report.stats.errors += 1;
            return false;
        } else {
            log::info!("Updated {:?}", path);
        }

        report.stats.updated += 1;
        report.changed.push(path.to_path_buf());
        true
    }
}
