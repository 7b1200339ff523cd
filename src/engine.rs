//! Reconciliation of requested handler assignments against the registry.
//!
//! A run stages any number of requests (fetch current state, resolve the
//! handler, filter refused targets, diff), then finishes once: the pending
//! changes are either reported as a dry run, declined at the consent
//! prompt, or written.

use crate::consent::Consent;
use crate::error::DootiError;
use crate::registry::{Registry, TypeCache};
use crate::resolver::HandlerResolver;
use crate::scope::Scope;
use itertools::Itertools;
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Current handler per identifier; `None` when nothing is registered.
pub type Assignments = BTreeMap<String, Option<PathBuf>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub from: Option<PathBuf>,
    pub to: PathBuf,
}

/// Pending or applied changes, per scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub extensions: BTreeMap<String, Change>,
    pub schemes: BTreeMap<String, Change>,
    pub utis: BTreeMap<String, Change>,
}

impl ChangeSet {
    pub fn scope(&self, scope: Scope) -> &BTreeMap<String, Change> {
        match scope {
            Scope::Extension => &self.extensions,
            Scope::Scheme => &self.schemes,
            Scope::Uti => &self.utis,
        }
    }

    fn scope_mut(&mut self, scope: Scope) -> &mut BTreeMap<String, Change> {
        match scope {
            Scope::Extension => &mut self.extensions,
            Scope::Scheme => &mut self.schemes,
            Scope::Uti => &mut self.utis,
        }
    }

    pub fn is_empty(&self) -> bool {
        Scope::ALL.iter().all(|&scope| self.scope(scope).is_empty())
    }

    pub fn len(&self) -> usize {
        Scope::ALL.iter().map(|&scope| self.scope(scope).len()).sum()
    }

    /// All changes in scope order.
    pub fn iter(&self) -> impl Iterator<Item = (Scope, &String, &Change)> + '_ {
        Scope::ALL.into_iter().flat_map(move |scope| {
            self.scope(scope)
                .iter()
                .map(move |(identifier, change)| (scope, identifier, change))
        })
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Changes were written (possibly none were needed).
    Applied,
    /// Changes were computed but never written.
    DryRun,
    /// The user refused the pending changes.
    Declined,
    /// A fatal error stopped the run before anything was written.
    Failed,
}

/// Process exit status of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success,
    Errors,
    Declined,
}

impl Exit {
    pub fn code(self) -> i32 {
        match self {
            Exit::Success => 0,
            Exit::Errors => 1,
            Exit::Declined => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub changes: ChangeSet,
    /// Changes the user declined; only present for [`Outcome::Declined`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed: Option<ChangeSet>,
    pub errors: Vec<String>,
    #[serde(skip)]
    pub outcome: Outcome,
}

impl RunResult {
    pub fn exit(&self) -> Exit {
        if self.outcome == Outcome::Declined {
            Exit::Declined
        } else if self.errors.is_empty() {
            Exit::Success
        } else {
            Exit::Errors
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub assume_yes: bool,
    pub dry_run: bool,
}

/// Make `handler` the default for every identifier in `targets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub scope: Scope,
    pub targets: Vec<String>,
    pub handler: String,
}

/// One reconciliation run. Holds the handler and extension type caches for
/// the run, the pending diff and the per-target errors collected so far.
pub struct Reconciler<'r> {
    registry: TypeCache<'r>,
    resolver: HandlerResolver<'r>,
    pending: ChangeSet,
    errors: Vec<String>,
}

impl<'r> Reconciler<'r> {
    pub fn new(registry: &'r dyn Registry) -> Self {
        Self {
            registry: TypeCache::new(registry),
            resolver: HandlerResolver::new(registry),
            pending: ChangeSet::default(),
            errors: Vec::new(),
        }
    }

    /// Current handlers of `targets`.
    ///
    /// Every target is validated before the registry is consulted.
    pub fn current(&self, scope: Scope, targets: &[String]) -> Result<Assignments, DootiError> {
        targets.iter().try_for_each(|target| scope.validate(target))?;

        targets
            .iter()
            .map(|target| Ok((target.clone(), scope.current(&self.registry, target)?)))
            .collect()
    }

    /// Add the changes needed to satisfy `request` to the pending diff.
    ///
    /// Per-target problems are recorded and skipped; anything else (a
    /// `file` scheme, registry failures) is returned and should end the run.
    pub fn stage(&mut self, request: &Request, allow_dynamic: bool) -> Result<(), DootiError> {
        let scope = request.scope;
        let targets: Vec<String> = request.targets.iter().unique().cloned().collect();
        let mut current = self.current(scope, &targets)?;

        let handler = match self.resolver.resolve(&request.handler) {
            Ok(handler) => handler,
            Err(err) if err.is_per_target() => {
                self.errors.push(err.to_string());
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        for target in targets {
            if let Some(refusal) = scope.refusal(&self.registry, &target, allow_dynamic)? {
                self.errors.push(refusal.to_string());
                continue;
            }

            let from = current.remove(&target).flatten();
            if from.as_ref() == Some(&handler) {
                debug!("{scope} {target} is already handled by {}", handler.display());
                self.pending.scope_mut(scope).remove(&target);
                continue;
            }

            self.pending.scope_mut(scope).insert(
                target,
                Change {
                    from,
                    to: handler.clone(),
                },
            );
        }

        Ok(())
    }

    /// End the run without writing anything, keeping the errors collected so far.
    pub fn fail(mut self, err: DootiError) -> RunResult {
        self.errors.push(err.to_string());
        RunResult {
            changes: ChangeSet::default(),
            proposed: None,
            errors: self.errors,
            outcome: Outcome::Failed,
        }
    }

    /// Confirm and write the pending changes.
    pub fn finish(self, options: RunOptions, consent: &mut dyn Consent) -> RunResult {
        let Self {
            registry,
            pending,
            mut errors,
            ..
        } = self;

        if options.dry_run {
            return RunResult {
                changes: pending,
                proposed: None,
                errors,
                outcome: Outcome::DryRun,
            };
        }

        if !pending.is_empty() && !options.assume_yes && !consent.confirm(&pending) {
            info!("Did not get consent to apply changes. Exiting.");
            return RunResult {
                changes: ChangeSet::default(),
                proposed: Some(pending),
                errors,
                outcome: Outcome::Declined,
            };
        }

        debug!("Applying {} change(s)", pending.len());
        let mut applied = ChangeSet::default();
        for (scope, identifier, change) in pending.iter() {
            match scope.apply(&registry, identifier, &change.to) {
                Ok(()) => {
                    applied
                        .scope_mut(scope)
                        .insert(identifier.clone(), change.clone());
                }
                Err(err) => errors.push(err.to_string()),
            }
        }

        RunResult {
            changes: applied,
            proposed: None,
            errors,
            outcome: Outcome::Applied,
        }
    }
}
