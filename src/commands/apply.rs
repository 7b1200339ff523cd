use crate::cli::ApplyArgs;
use crate::commands::{CommandContext, CommandExecutor};
use crate::config::{find_config, Definitions};
use crate::engine::{Exit, Reconciler};
use anyhow::Result;
use log::debug;

/// `apply`: reconcile every assignment of a config file in one run.
pub struct ApplyCommand {
    args: ApplyArgs,
}

impl ApplyCommand {
    pub fn new(args: ApplyArgs) -> Self {
        Self { args }
    }
}

impl CommandExecutor for ApplyCommand {
    fn execute(self, ctx: &mut CommandContext<'_>) -> Result<Exit> {
        let mut reconciler = Reconciler::new(ctx.registry);

        let definitions = match find_config(self.args.file.as_deref(), &ctx.config_home)
            .and_then(|path| Definitions::load(&path))
        {
            Ok(definitions) => definitions,
            Err(err) => return ctx.report(reconciler.fail(err)),
        };

        for request in definitions.requests() {
            debug!(
                "Staging {} {} -> {}",
                request.scope,
                request.targets.join(", "),
                request.handler
            );
            if let Err(err) = reconciler.stage(&request, self.args.dynamic) {
                return ctx.report(reconciler.fail(err));
            }
        }

        let result = reconciler.finish(ctx.options, &mut *ctx.consent);
        ctx.report(result)
    }
}
