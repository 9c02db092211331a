//! Report printing, as plain text or JSON.

use anyhow::{Context, Result};
use mdtidy_core::{OrganizeReport, RunReport};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn emit_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    let rendered =
        serde_json::to_string_pretty(value).context("failed to serialize report as JSON")?;
    writeln!(out, "{}", rendered)?;
    Ok(())
}

pub fn write_run_text(
    out: &mut dyn Write,
    command: &str,
    target: &Path,
    report: &RunReport,
    dry_run: bool,
) -> Result<()> {
    let stats = &report.stats;
    writeln!(
        out,
        "{} {}: {} processed, {} {}, {} skipped, {} errors",
        command,
        target.display(),
        stats.processed,
        stats.updated,
        if dry_run { "would update" } else { "updated" },
        stats.skipped,
        stats.errors
    )?;
    for path in &report.changed {
        writeln!(out, "  {}", path.display())?;
    }
    Ok(())
}

pub fn write_organize_text(
    out: &mut dyn Write,
    destination: &Path,
    report: &OrganizeReport,
    executed: bool,
) -> Result<()> {
    let mut by_target: BTreeMap<String, Vec<&Path>> = BTreeMap::new();
    for copy in &report.planned {
        by_target
            .entry(copy.target.to_string())
            .or_default()
            .push(&copy.source);
    }

    if !by_target.is_empty() {
        writeln!(
            out,
            "{} ({}):",
            if executed { "Copied" } else { "Would copy" },
            report.planned.len()
        )?;
        for (target, sources) in &by_target {
            writeln!(out, "  {}/", target)?;
            for source in sources {
                writeln!(out, "    {}", file_label(source))?;
            }
        }
    }

    if !report.existing.is_empty() {
        writeln!(out, "Already present ({}):", report.existing.len())?;
        for existing in &report.existing {
            let shown = existing
                .existing
                .strip_prefix(destination)
                .unwrap_or(&existing.existing);
            let note = match existing.identical {
                Some(false) if executed => " (refreshed)",
                Some(false) => " (would refresh)",
                Some(true) => " (identical)",
                None => "",
            };
            writeln!(
                out,
                "  {} -> {}{}",
                file_label(&existing.source),
                shown.display(),
                note
            )?;
        }
    }

    let stats = &report.stats;
    writeln!(
        out,
        "{} processed, {} copied, {} existed, {} refreshed, {} skipped, {} errors",
        stats.processed, stats.copied, stats.existed, stats.refreshed, stats.skipped, stats.errors
    )?;
    Ok(())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// JSON shape of an in-place pass.
#[derive(Serialize)]
pub struct RunOutput<'a> {
    pub command: &'a str,
    pub target: &'a Path,
    pub dry_run: bool,
    #[serde(flatten)]
    pub report: &'a RunReport,
}

/// JSON shape of an organize run, with the follow-up format passes.
#[derive(Serialize)]
pub struct OrganizeOutput<'a> {
    pub command: &'a str,
    pub executed: bool,
    #[serde(flatten)]
    pub report: &'a OrganizeReport,
    pub formatted: Vec<FormattedDir>,
}

#[derive(Serialize)]
pub struct FormattedDir {
    pub dir: PathBuf,
    #[serde(flatten)]
    pub report: RunReport,
}
