use crate::engine::ChangeSet;
use crate::scope::Scope;
use dialoguer::console::Term;
use dialoguer::Confirm;
use log::debug;
use std::fmt::Write as _;
use std::path::Path;

/// Asks whether a set of pending changes may be written.
pub trait Consent {
    fn confirm(&mut self, pending: &ChangeSet) -> bool;
}

/// Every pending change, grouped by scope, followed by a blank line.
pub fn describe(pending: &ChangeSet) -> String {
    let mut text = String::new();

    for scope in Scope::ALL {
        let changes = pending.scope(scope);
        if changes.is_empty() {
            continue;
        }

        if changes.len() == 1 {
            let _ = writeln!(text, "The following {scope} is set to be changed:");
        } else {
            let _ = writeln!(text, "The following {scope}s are set to be changed:");
        }

        for (identifier, change) in changes {
            let _ = writeln!(
                text,
                "{identifier}: {} -> {}",
                change.from.as_deref().map_or("None".into(), Path::to_string_lossy),
                change.to.display()
            );
        }
    }

    text.push('\n');
    text
}

/// Lists the changes and asks on the terminal's standard error.
///
/// Ctrl-C, a closed input and a missing terminal all count as "no".
#[derive(Debug, Default)]
pub struct TerminalConsent;

impl Consent for TerminalConsent {
    fn confirm(&mut self, pending: &ChangeSet) -> bool {
        let term = Term::stderr();
        if let Err(err) = term.write_str(&describe(pending)) {
            debug!("Could not show pending changes: {err}");
            return false;
        }

        match Confirm::new()
            .with_prompt("Do you want to continue?")
            .default(false)
            .wait_for_newline(true)
            .interact_on(&term)
        {
            Ok(answer) => answer,
            Err(err) => {
                debug!("No answer to the consent prompt: {err}");
                // Keep the following log line off the prompt line.
                let _ = term.write_line("");
                false
            }
        }
    }
}
