use std::path::PathBuf;

use super::{Engine, RunReport};
use crate::error::TidyResult;
use crate::heading::{fill_empty_title, reconcile_title, FillOutcome, ReconcileOutcome};
use crate::normalize::trim_trailing_whitespace;

#[derive(Debug, Clone)]
pub struct TitleRun {
    pub root: PathBuf,
    pub dry_run: bool,
}

impl TitleRun {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
        }
    }
}

impl Engine {
    /// Fill missing or blank titles from the first `##` heading, recursively.
    pub fn fix_empty_titles(&self, run: &TitleRun) -> TidyResult<RunReport> {
        self.ensure_dir(&run.root)?;
        let mut report = RunReport::default();

        for path in self.list_markdown(&run.root, true) {
            report.stats.processed += 1;
            let Some(mut loaded) = self.load_for_rewrite(&path, &mut report) else {
                continue;
            };

            match fill_empty_title(&mut loaded.doc) {
                FillOutcome::AlreadySet => {}
                FillOutcome::Filled(title) => {
                    log::info!("{:?}: title set to '{}'", path, title);
                    // A new title key lands last; move it to its canonical slot.
                    self.normalizer.reorder(&mut loaded.doc);
                    self.store_document(&path, &loaded, run.dry_run, &mut report);
                }
                FillOutcome::MissingHeading => {
                    log::warn!("Skipping {:?}: empty title and no level-2 heading", path);
                    report.stats.skipped += 1;
                }
            }
        }

        Ok(report)
    }

    /// Reconcile title and first `##` heading for the files directly in
    /// `run.root`, trimming trailing blank lines on the way.
    pub fn sync_titles(&self, run: &TitleRun) -> TidyResult<RunReport> {
        self.ensure_dir(&run.root)?;
        let mut report = RunReport::default();

        for path in self.list_markdown(&run.root, false) {
            report.stats.processed += 1;
            let Some(mut loaded) = self.load_for_rewrite(&path, &mut report) else {
                continue;
            };

            let reconciled = match reconcile_title(&mut loaded.doc) {
                ReconcileOutcome::MissingTitle => {
                    log::warn!("Skipping {:?}: no title field", path);
                    report.stats.skipped += 1;
                    continue;
                }
                ReconcileOutcome::MissingHeading => {
                    log::warn!("Skipping {:?}: no level-2 heading", path);
                    report.stats.skipped += 1;
                    continue;
                }
                ReconcileOutcome::Updated {
                    old_title,
                    new_title,
                    heading_rewritten,
                } => {
                    log::info!(
                        "{:?}: '{}' -> '{}'{}",
                        path,
                        old_title,
                        new_title,
                        if heading_rewritten { " (heading rewritten)" } else { "" }
                    );
                    true
                }
                ReconcileOutcome::Unchanged => false,
            };

            let trimmed = trim_trailing_whitespace(&mut loaded.doc);
            // Re-rendering the header would drop comments and flow style.
            if reconciled || trimmed {
                self.store_document(&path, &loaded, run.dry_run, &mut report);
            }
        }

        Ok(report)
    }
}
