use crate::consent::Consent;
use crate::engine::{Exit, RunOptions, RunResult};
use crate::output::{render, OutputFormat};
use crate::registry::Registry;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

/// Everything a command needs from the outside world.
pub struct CommandContext<'a> {
    pub registry: &'a dyn Registry,
    pub consent: &'a mut dyn Consent,
    pub out: &'a mut dyn Write,
    pub options: RunOptions,
    pub format: OutputFormat,
    /// Base directory for config discovery.
    pub config_home: PathBuf,
}

impl CommandContext<'_> {
    /// Write one document to the output.
    pub fn emit<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        render(value, self.format, self.out)
    }

    /// Write the result of a run and map it to the exit status.
    pub fn report(&mut self, result: RunResult) -> Result<Exit> {
        self.emit(&result)?;
        Ok(result.exit())
    }
}
