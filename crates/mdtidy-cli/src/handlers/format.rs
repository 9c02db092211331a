use anyhow::{Context, Result};
use mdtidy_core::FormatRun;
use std::io::Write;
use std::path::Path;

use super::run_in_place;
use crate::state::Session;

pub fn handle_format(
    session: &Session,
    out: &mut dyn Write,
    dir: &Path,
    recursive: bool,
    dry_run: bool,
) -> Result<()> {
    let run = FormatRun {
        dir: dir.to_path_buf(),
        recursive,
        dry_run,
    };
    run_in_place(session, out, "format", dir, dry_run, |session| {
        session
            .engine
            .format_directory(&run)
            .with_context(|| format!("cannot format {}", dir.display()))
    })
}
