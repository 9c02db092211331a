mod format;
mod organize;
mod titles;

pub use format::*;
pub use organize::*;
pub use titles::*;

use anyhow::Result;
use mdtidy_core::RunReport;
use std::io::Write;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::output::{self, RunOutput};
use crate::state::Session;

/// Shared flow of the in-place passes: confirm unless dry, run, report.
fn run_in_place<F>(
    session: &Session,
    out: &mut dyn Write,
    command: &str,
    target: &Path,
    dry_run: bool,
    pass: F,
) -> Result<()>
where
    F: FnOnce(&Session) -> Result<RunReport>,
{
    if !dry_run {
        let question = format!("{}: rewrite Markdown files in {}?", command, target.display());
        if !session.approve(&question)? {
            return report_aborted(session, out, command);
        }
    }

    let report = pass(session)?;
    match session.output {
        OutputFormat::Text => output::write_run_text(out, command, target, &report, dry_run),
        OutputFormat::Json => output::emit_json(
            out,
            &RunOutput {
                command,
                target,
                dry_run,
                report: &report,
            },
        ),
    }
}

fn report_aborted(session: &Session, out: &mut dyn Write, command: &str) -> Result<()> {
    log::info!("{} aborted by user", command);
    match session.output {
        OutputFormat::Text => {
            writeln!(out, "Aborted, nothing written.")?;
            Ok(())
        }
        OutputFormat::Json => output::emit_json(
            out,
            &serde_json::json!({ "command": command, "aborted": true }),
        ),
    }
}
