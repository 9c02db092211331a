//! mdtidy CLI Library
//!
//! Command-line layer: parses arguments, loads configuration and hands each
//! command to the core `Engine`.

use anyhow::Result;
use std::io::Write;

pub mod cli;
mod config;
mod handlers;
mod output;
mod prompt;
mod state;


pub use cli::{Cli, Command, OutputFormat};
pub use config::{flag_level, init_logging, load_config};
pub use handlers::OrganizeArgs;
pub use state::Session;

/// Dispatch the parsed command, writing the report to `out`.
pub fn execute(session: &Session, command: &Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Format {
            dir,
            recursive,
            dry_run,
        } => handlers::handle_format(session, out, dir, *recursive, *dry_run),
        Command::FixTitles { root, dry_run } => {
            handlers::handle_fix_titles(session, out, root, *dry_run)
        }
        Command::SyncTitles { dir, dry_run } => {
            handlers::handle_sync_titles(session, out, dir, *dry_run)
        }
        Command::Organize {
            source,
            destination,
            dry_run,
            cache,
            cache_file,
            rebuild_cache,
            compare_content,
            format,
        } => {
            let args = OrganizeArgs {
                source: source.clone(),
                destination: destination.clone(),
                dry_run: *dry_run,
                cache: *cache,
                cache_file: cache_file.clone(),
                rebuild_cache: *rebuild_cache,
                compare_content: *compare_content,
                format: *format,
            };
            handlers::handle_organize(session, out, &args)
        }
    }
}

/// Full invocation as the binary runs it: config, logging, dispatch to stdout.
pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    init_logging(&cli, &config);
    log::debug!("Configuration: {:?}", config);

    let session = Session::new(&cli, config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&session, &cli.command, &mut out)?;
    out.flush()?;
    Ok(())
}
