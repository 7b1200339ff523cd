use crate::cli::{Cli, CompletionsArgs};
use crate::commands::{CommandContext, CommandExecutor};
use crate::engine::Exit;
use anyhow::{Context, Result};
use clap::CommandFactory;
use log::info;
use std::fs;

pub struct CompletionsCommand {
    args: CompletionsArgs,
}

impl CompletionsCommand {
    pub fn new(args: CompletionsArgs) -> Self {
        Self { args }
    }
}

impl CommandExecutor for CompletionsCommand {
    fn execute(self, ctx: &mut CommandContext<'_>) -> Result<Exit> {
        let mut command = Cli::command();
        let shell = self.args.shell;
        let bin_name = self.args.bin_name;

        if let Some(path) = self.args.output {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let mut file = fs::File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            clap_complete::generate(shell, &mut command, bin_name, &mut file);
            info!("Generated {shell} completions at {}", path.display());
        } else {
            clap_complete::generate(shell, &mut command, bin_name, &mut *ctx.out);
        }

        Ok(Exit::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RunOptions;
    use crate::output::OutputFormat;
    use crate::test_support::{MemoryRegistry, ScriptedConsent};
    use clap_complete::Shell;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn execute(args: CompletionsArgs) -> Vec<u8> {
        let registry = MemoryRegistry::default();
        let mut consent = ScriptedConsent::answering(false);
        let mut out = Vec::new();
        let mut ctx = CommandContext {
            registry: &registry,
            consent: &mut consent,
            out: &mut out,
            options: RunOptions::default(),
            format: OutputFormat::Yaml,
            config_home: PathBuf::from("/nonexistent"),
        };
        let exit = CompletionsCommand::new(args).execute(&mut ctx).unwrap();
        assert_eq!(exit, Exit::Success);
        out
    }

    #[test]
    fn writes_script_to_output() {
        let out = execute(CompletionsArgs {
            shell: Shell::Bash,
            output: None,
            bin_name: "dooti".into(),
        });
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("_dooti"));
    }

    #[test]
    fn writes_script_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("completions/_dooti");

        let out = execute(CompletionsArgs {
            shell: Shell::Zsh,
            output: Some(path.clone()),
            bin_name: "dooti".into(),
        });

        assert!(out.is_empty());
        assert!(fs::read_to_string(path).unwrap().contains("dooti"));
    }
}
