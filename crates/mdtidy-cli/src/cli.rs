use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use mdtidy_core::config::CacheMode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mdtidy",
    version,
    about = "Keep Markdown frontmatter, titles and exam file layout tidy",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Configuration file (defaults to `.mdtidy.yaml` in the working directory).
    #[arg(long, short = 'c', value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// More logging; repeat for trace output.
    #[arg(short, long, action = ArgAction::Count, global = true, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Do not ask before writing.
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Report format.
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Normalize frontmatter and assign missing weights.
    Format {
        dir: PathBuf,
        /// Include subdirectories.
        #[arg(short, long)]
        recursive: bool,
        #[arg(long)]
        dry_run: bool,
    },
    /// Fill empty titles from the first level-2 heading, recursively.
    FixTitles {
        root: PathBuf,
        #[arg(long)]
        dry_run: bool,
    },
    /// Make each title and its first level-2 heading agree.
    SyncTitles {
        dir: PathBuf,
        #[arg(long)]
        dry_run: bool,
    },
    /// Copy exam files into `<level>/<kind>/` directories.
    Organize {
        source: PathBuf,
        destination: PathBuf,
        /// Show the plan without copying.
        #[arg(long)]
        dry_run: bool,
        /// How existing files are looked up (defaults to the configured mode).
        #[arg(long, value_enum)]
        cache: Option<CacheArg>,
        /// Cache side file, relative to the destination unless absolute.
        #[arg(long, value_name = "FILE")]
        cache_file: Option<PathBuf>,
        /// Ignore a saved cache and walk the destination again.
        #[arg(long)]
        rebuild_cache: bool,
        /// Compare content of same-named files and refresh differing copies.
        #[arg(long)]
        compare_content: bool,
        /// Run `format` on every directory that received files.
        #[arg(long)]
        format: bool,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CacheArg {
    Off,
    Memory,
    Persistent,
}

impl From<CacheArg> for CacheMode {
    fn from(arg: CacheArg) -> Self {
        match arg {
            CacheArg::Off => CacheMode::Off,
            CacheArg::Memory => CacheMode::Memory,
            CacheArg::Persistent => CacheMode::Persistent,
        }
    }
}
