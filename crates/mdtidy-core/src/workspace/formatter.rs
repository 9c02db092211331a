use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::file_ops::LoadedDocument;
use super::{Engine, RunReport};
use crate::config::WeightScope;
use crate::error::TidyResult;
use crate::normalize::{max_weight, plan_weights, Rule, WeightCandidate};
use crate::utils::file_name_of;

#[derive(Debug, Clone)]
pub struct FormatRun {
    pub dir: PathBuf,
    pub recursive: bool,
    pub dry_run: bool,
}

impl FormatRun {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            recursive: false,
            dry_run: false,
        }
    }
}

struct Pending {
    path: PathBuf,
    file_name: String,
    loaded: LoadedDocument,
    applied: Vec<Rule>,
}

impl Engine {
    /// Normalize every parseable Markdown file under `run.dir` and give
    /// unweighted documents the next weights of their scope.
    pub fn format_directory(&self, run: &FormatRun) -> TidyResult<RunReport> {
        self.ensure_dir(&run.dir)?;
        log::info!("Formatting {:?} (recursive: {})", run.dir, run.recursive);

        let mut report = RunReport::default();
        let mut pending = Vec::new();

        for path in self.list_markdown(&run.dir, run.recursive) {
            report.stats.processed += 1;
            let Some(mut loaded) = self.load_for_rewrite(&path, &mut report) else {
                continue;
            };
            let file_name = file_name_of(&path);
            let applied = self.normalizer.normalize(&mut loaded.doc, &file_name);
            pending.push(Pending {
                path,
                file_name,
                loaded,
                applied,
            });
        }

        self.assign_weights(&run.dir, &mut pending);

        for item in &pending {
            if self.store_document(&item.path, &item.loaded, run.dry_run, &mut report) {
                log::debug!("{:?}: {:?}", item.path, item.applied);
            }
        }

        log::info!(
            "Formatted {:?}: {} processed, {} updated, {} skipped, {} errors",
            run.dir,
            report.stats.processed,
            report.stats.updated,
            report.stats.skipped,
            report.stats.errors
        );
        Ok(report)
    }

    fn assign_weights(&self, root: &Path, pending: &mut [Pending]) {
        let mut groups: BTreeMap<PathBuf, Vec<usize>> = BTreeMap::new();
        for (index, item) in pending.iter().enumerate() {
            let key = match self.config.weight.scope {
                WeightScope::Directory => item
                    .path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf()),
                WeightScope::Tree => root.to_path_buf(),
            };
            groups.entry(key).or_default().push(index);
        }

        for (dir, members) in groups {
            let current_max =
                max_weight(members.iter().filter_map(|&i| pending[i].loaded.doc.weight()));

            let unweighted: Vec<usize> = members
                .iter()
                .copied()
                .filter(|&i| pending[i].loaded.doc.weight().is_none())
                .collect();
            if unweighted.is_empty() {
                continue;
            }

            let candidates: Vec<WeightCandidate> = unweighted
                .iter()
                .map(|&i| {
                    WeightCandidate {
                        file_name: pending[i].file_name.clone(),
                        date: self.normalizer.parse_document_date(&pending[i].loaded.doc),
                    }
                })
                .collect();

            log::debug!(
                "{:?}: {} documents need a weight, continuing after {}",
                dir,
                candidates.len(),
                current_max
            );

            for (candidate, weight) in plan_weights(&candidates, current_max) {
                let item = &mut pending[unweighted[candidate]];
                item.loaded.doc.set("weight", Value::Number(weight.into()));
                // A newly inserted key lands last; put it back in its slot.
                self.normalizer.reorder(&mut item.loaded.doc);
                item.applied.push(Rule::Weight);
            }
        }
    }
}
