use crate::cli::TargetArgs;
use crate::commands::{CommandContext, CommandExecutor};
use crate::engine::{Exit, Reconciler, Request};
use crate::scope::Scope;
use anyhow::Result;

/// `ext`, `scheme` and `uti`: show the current handlers of the targets, or
/// make `--handler` their default.
pub struct TargetCommand {
    scope: Scope,
    args: TargetArgs,
    allow_dynamic: bool,
}

impl TargetCommand {
    pub fn new(scope: Scope, args: TargetArgs, allow_dynamic: bool) -> Self {
        Self {
            scope,
            args,
            allow_dynamic,
        }
    }
}

impl CommandExecutor for TargetCommand {
    fn execute(self, ctx: &mut CommandContext<'_>) -> Result<Exit> {
        let mut reconciler = Reconciler::new(ctx.registry);

        let Some(handler) = self.args.handler else {
            return match reconciler.current(self.scope, &self.args.targets) {
                Ok(current) => {
                    ctx.emit(&current)?;
                    Ok(Exit::Success)
                }
                Err(err) => ctx.report(reconciler.fail(err)),
            };
        };

        let request = Request {
            scope: self.scope,
            targets: self.args.targets,
            handler,
        };
        let result = match reconciler.stage(&request, self.allow_dynamic) {
            Ok(()) => reconciler.finish(ctx.options, &mut *ctx.consent),
            Err(err) => reconciler.fail(err),
        };
        ctx.report(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RunOptions;
    use crate::output::OutputFormat;
    use crate::test_support::{MemoryRegistry, ScriptedConsent};
    use std::path::PathBuf;

    const PREVIEW: &str = "/System/Applications/Preview.app";

    fn registry() -> MemoryRegistry {
        MemoryRegistry::default()
            .with_extension("txt", &["public.plain-text"])
            .with_type_handler("public.plain-text", "/Applications/TextEdit.app")
            .with_scheme_handler("https", "/Applications/Safari.app")
            .with_app("Preview", PREVIEW)
    }

    fn run(
        registry: &MemoryRegistry,
        consent: &mut ScriptedConsent,
        options: RunOptions,
        command: TargetCommand,
    ) -> (Exit, serde_json::Value) {
        let mut out = Vec::new();
        let exit = {
            let mut ctx = CommandContext {
                registry,
                consent,
                out: &mut out,
                options,
                format: OutputFormat::Json,
                config_home: PathBuf::from("/nonexistent"),
            };
            command.execute(&mut ctx).unwrap()
        };
        (exit, serde_json::from_slice(&out).unwrap())
    }

    fn args(targets: &[&str], handler: Option<&str>) -> TargetArgs {
        TargetArgs {
            targets: targets.iter().map(|t| t.to_string()).collect(),
            handler: handler.map(str::to_string),
        }
    }

    #[test]
    fn query_emits_bare_mapping() {
        let registry = registry();
        let (exit, json) = run(
            &registry,
            &mut ScriptedConsent::answering(false),
            RunOptions::default(),
            TargetCommand::new(Scope::Scheme, args(&["https", "gopher"], None), false),
        );

        assert_eq!(exit, Exit::Success);
        assert_eq!(
            json,
            serde_json::json!({"https": "/Applications/Safari.app", "gopher": null})
        );
        assert!(registry.writes().is_empty());
    }

    #[test]
    fn querying_file_scheme_reports_an_error() {
        let registry = registry();
        let (exit, json) = run(
            &registry,
            &mut ScriptedConsent::answering(false),
            RunOptions::default(),
            TargetCommand::new(Scope::Scheme, args(&["file"], None), false),
        );

        assert_eq!(exit, Exit::Errors);
        assert_eq!(json["errors"][0], "The file:// scheme cannot be looked up.");
        assert_eq!(registry.reads(), 0);
    }

    #[test]
    fn set_reports_applied_changes() {
        let registry = registry();
        let (exit, json) = run(
            &registry,
            &mut ScriptedConsent::answering(true),
            RunOptions::default(),
            TargetCommand::new(Scope::Extension, args(&["txt"], Some("Preview")), false),
        );

        assert_eq!(exit, Exit::Success);
        assert_eq!(
            json,
            serde_json::json!({
                "changes": {
                    "extensions": {
                        "txt": {"from": "/Applications/TextEdit.app", "to": PREVIEW}
                    },
                    "schemes": {},
                    "utis": {},
                },
                "errors": [],
            })
        );
    }

    #[test]
    fn declined_run_reports_proposed_changes() {
        let registry = registry();
        let (exit, json) = run(
            &registry,
            &mut ScriptedConsent::answering(false),
            RunOptions::default(),
            TargetCommand::new(Scope::Uti, args(&["public.html"], Some("Preview")), false),
        );

        assert_eq!(exit, Exit::Declined);
        assert_eq!(exit.code(), 2);
        assert_eq!(json["changes"]["utis"], serde_json::json!({}));
        assert_eq!(json["proposed"]["utis"]["public.html"]["from"], serde_json::Value::Null);
        assert_eq!(json["proposed"]["utis"]["public.html"]["to"], PREVIEW);
        assert!(registry.writes().is_empty());
    }

    #[test]
    fn dynamic_flag_only_affects_extensions() {
        let registry = registry();
        let (exit, json) = run(
            &registry,
            &mut ScriptedConsent::answering(true),
            RunOptions {
                assume_yes: true,
                dry_run: false,
            },
            TargetCommand::new(Scope::Extension, args(&["fooobaar"], Some("Preview")), true),
        );

        assert_eq!(exit, Exit::Success);
        assert_eq!(json["changes"]["extensions"]["fooobaar"]["to"], PREVIEW);
    }
}
