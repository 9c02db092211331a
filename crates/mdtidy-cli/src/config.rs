use anyhow::{Context, Result};
use mdtidy_core::config::LogLevel;
use mdtidy_core::TidyConfig;

use crate::cli::Cli;

/// Load `--config`, or `.mdtidy.yaml` from the working directory, or defaults.
pub fn load_config(cli: &Cli) -> Result<TidyConfig> {
    let cwd = std::env::current_dir().context("failed to read the working directory")?;
    TidyConfig::load(cli.config.as_deref(), &cwd).with_context(|| match &cli.config {
        Some(path) => format!("failed to load configuration from {}", path.display()),
        None => format!("failed to load {}", TidyConfig::DEFAULT_FILE_NAME),
    })
}

/// Level forced by `-v`/`-q`. `None` leaves the choice to `RUST_LOG`, then the config.
pub fn flag_level(cli: &Cli) -> Option<LogLevel> {
    if cli.quiet {
        return Some(LogLevel::Error);
    }
    match cli.verbose {
        0 => None,
        1 => Some(LogLevel::Debug),
        _ => Some(LogLevel::Trace),
    }
}

/// Install the global logger. Later calls are ignored.
pub fn init_logging(cli: &Cli, config: &TidyConfig) {
    let env = env_logger::Env::default().default_filter_or(config.logging.level.as_filter());
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(level) = flag_level(cli) {
        builder.parse_filters(level.as_filter());
    }
    builder.format_timestamp(None);
    let _ = builder.try_init();
}
