use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use mdtidy_core::{Engine, PhysicalFileSystem, TidyConfig};

use crate::cli::{Cli, OutputFormat};
use crate::prompt;

type Confirm = Box<dyn Fn(&str) -> io::Result<bool>>;

/// Everything a command handler needs for one invocation.
pub struct Session {
    pub engine: Engine,
    pub output: OutputFormat,
    assume_yes: bool,
    confirm: Confirm,
}

impl Session {
    pub fn new(cli: &Cli, config: TidyConfig) -> Result<Self> {
        let engine = Engine::new(config, Arc::new(PhysicalFileSystem))
            .context("invalid configuration")?;
        Ok(Self {
            engine,
            output: cli.output,
            assume_yes: cli.yes,
            confirm: Box::new(prompt::confirm),
        })
    }

    /// Replace the terminal prompt, e.g. with a scripted answer.
    pub fn with_confirm(mut self, confirm: impl Fn(&str) -> io::Result<bool> + 'static) -> Self {
        self.confirm = Box::new(confirm);
        self
    }

    pub fn assumes_yes(&self) -> bool {
        self.assume_yes
    }

    /// `true` when writing may go ahead: `--yes` was given or the user agreed.
    pub fn approve(&self, question: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        (self.confirm)(question).context("failed to read confirmation")
    }
}
