use crate::cli::Command;
use crate::engine::Exit;
use crate::scope::Scope;
use anyhow::Result;

mod apply;
mod completions;
mod context;
mod target;

pub use apply::ApplyCommand;
pub use completions::CompletionsCommand;
pub use context::CommandContext;
pub use target::TargetCommand;

pub trait CommandExecutor {
    fn execute(self, ctx: &mut CommandContext<'_>) -> Result<Exit>;
}

pub fn dispatch(command: Command, ctx: &mut CommandContext<'_>) -> Result<Exit> {
    match command {
        Command::Apply(args) => ApplyCommand::new(args).execute(ctx),
        Command::Ext(args) => {
            TargetCommand::new(Scope::Extension, args.target, args.dynamic).execute(ctx)
        }
        Command::Scheme(args) => TargetCommand::new(Scope::Scheme, args, false).execute(ctx),
        Command::Uti(args) => TargetCommand::new(Scope::Uti, args, false).execute(ctx),
        Command::Completions(args) => CompletionsCommand::new(args).execute(ctx),
        Command::BuildInfo => {
            crate::cli::show_build_info();
            Ok(Exit::Success)
        }
    }
}
