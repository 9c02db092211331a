use anyhow::{Context, Result};
use mdtidy_core::config::CacheMode;
use mdtidy_core::{
    CacheStrategy, DuplicatePolicy, FormatRun, OrganizeMode, OrganizeReport, OrganizeRun,
};
use std::io::Write;
use std::path::PathBuf;

use super::report_aborted;
use crate::cli::{CacheArg, OutputFormat};
use crate::output::{self, FormattedDir, OrganizeOutput};
use crate::state::Session;

#[derive(Debug, Clone)]
pub struct OrganizeArgs {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub dry_run: bool,
    pub cache: Option<CacheArg>,
    pub cache_file: Option<PathBuf>,
    pub rebuild_cache: bool,
    pub compare_content: bool,
    pub format: bool,
}

impl OrganizeArgs {
    /// Resolve the run against the configured cache defaults.
    pub fn to_run(&self, session: &Session) -> OrganizeRun {
        let configured = &session.engine.config.cache;
        let mode = self.cache.map(CacheMode::from).unwrap_or(configured.mode);
        let cache = match mode {
            CacheMode::Off => CacheStrategy::Off,
            CacheMode::Memory => CacheStrategy::Memory,
            CacheMode::Persistent => CacheStrategy::Persistent(
                self.cache_file
                    .clone()
                    .unwrap_or_else(|| configured.file.clone()),
            ),
        };

        OrganizeRun {
            source: self.source.clone(),
            destination: self.destination.clone(),
            mode: OrganizeMode::Preview,
            cache,
            rebuild_cache: self.rebuild_cache,
            duplicates: if self.compare_content {
                DuplicatePolicy::ByContent
            } else {
                DuplicatePolicy::ByName
            },
        }
    }
}

/// Preview first; execute only after confirmation, then optionally format
/// every directory that received files.
pub fn handle_organize(session: &Session, out: &mut dyn Write, args: &OrganizeArgs) -> Result<()> {
    let mut run = args.to_run(session);
    let preview = organize(session, &run)?;

    let pending = preview.stats.copied + preview.stats.refreshed;
    if args.dry_run || pending == 0 {
        if args.format && args.dry_run {
            log::info!("Dry run: formatting of destination directories skipped");
        }
        return emit(session, out, args, &preview, false, Vec::new());
    }

    if !session.approve_with_plan(out, args, &preview)? {
        return report_aborted(session, out, "organize");
    }

    run.mode = OrganizeMode::Execute;
    let report = organize(session, &run)?;

    let mut formatted = Vec::new();
    if args.format {
        for dir in &report.copied_dirs {
            let format_run = FormatRun {
                dir: dir.clone(),
                recursive: false,
                dry_run: false,
            };
            let result = session
                .engine
                .format_directory(&format_run)
                .with_context(|| format!("cannot format {}", dir.display()))?;
            formatted.push(FormattedDir {
                dir: dir.clone(),
                report: result,
            });
        }
    }

    emit(session, out, args, &report, true, formatted)
}

fn organize(session: &Session, run: &OrganizeRun) -> Result<OrganizeReport> {
    session.engine.organize(run).with_context(|| {
        format!(
            "cannot organize {} into {}",
            run.source.display(),
            run.destination.display()
        )
    })
}

fn emit(
    session: &Session,
    out: &mut dyn Write,
    args: &OrganizeArgs,
    report: &OrganizeReport,
    executed: bool,
    formatted: Vec<FormattedDir>,
) -> Result<()> {
    match session.output {
        OutputFormat::Text => {
            output::write_organize_text(out, &args.destination, report, executed)?;
            for entry in &formatted {
                output::write_run_text(out, "format", &entry.dir, &entry.report, false)?;
            }
            Ok(())
        }
        OutputFormat::Json => output::emit_json(
            out,
            &OrganizeOutput {
                command: "organize",
                executed,
                report,
                formatted,
            },
        ),
    }
}

impl Session {
    /// Show the preview in text mode, then ask.
    fn approve_with_plan(
        &self,
        out: &mut dyn Write,
        args: &OrganizeArgs,
        preview: &OrganizeReport,
    ) -> Result<bool> {
        if self.output == OutputFormat::Text && !self.assumes_yes() {
            output::write_organize_text(out, &args.destination, preview, false)?;
        }
        let question = format!(
            "Copy {} and refresh {} files into {}?",
            preview.stats.copied,
            preview.stats.refreshed,
            args.destination.display()
        );
        self.approve(&question)
    }
}
