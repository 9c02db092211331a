use anyhow::{Context, Result};
use mdtidy_core::TitleRun;
use std::io::Write;
use std::path::Path;

use super::run_in_place;
use crate::state::Session;

pub fn handle_fix_titles(
    session: &Session,
    out: &mut dyn Write,
    root: &Path,
    dry_run: bool,
) -> Result<()> {
    let run = TitleRun {
        root: root.to_path_buf(),
        dry_run,
    };
    run_in_place(session, out, "fix-titles", root, dry_run, |session| {
        session
            .engine
            .fix_empty_titles(&run)
            .with_context(|| format!("cannot fix titles under {}", root.display()))
    })
}

pub fn handle_sync_titles(
    session: &Session,
    out: &mut dyn Write,
    dir: &Path,
    dry_run: bool,
) -> Result<()> {
    let run = TitleRun {
        root: dir.to_path_buf(),
        dry_run,
    };
    run_in_place(session, out, "sync-titles", dir, dry_run, |session| {
        session
            .engine
            .sync_titles(&run)
            .with_context(|| format!("cannot sync titles in {}", dir.display()))
    })
}
