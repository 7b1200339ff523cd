use super::mimeapps::{Group, MimeApps};
use itertools::Itertools;
use log::debug;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

/// The merged view of every `mimeapps.list` in the lookup cascade.
#[derive(Debug, Default)]
pub struct MimeAssociations {
    // Highest precedence first.
    files: Vec<MimeApps>,
}

impl MimeAssociations {
    pub fn load(files: &[PathBuf]) -> Self {
        let files = files
            .iter()
            .filter_map(|file| match fs::read_to_string(file) {
                Ok(contents) => Some(MimeApps::parse(&contents)),
                Err(e) => {
                    debug!("Skipping {}: {e}", file.display());
                    None
                }
            })
            .collect();

        Self { files }
    }

    #[cfg(test)]
    pub fn from_files(files: Vec<MimeApps>) -> Self {
        Self { files }
    }

    /// Candidate desktop IDs for `mime`, in the order they should be tried.
    ///
    /// Defaults from every file come before any added association. An added
    /// association is dropped when the same or a more important file lists
    /// it as removed.
    pub fn candidates(&self, mime: &str) -> Vec<&str> {
        let defaults = self
            .files
            .iter()
            .flat_map(|file| file.ids(Group::Default, mime));

        let mut removed = HashSet::new();
        let mut added = Vec::new();
        for file in &self.files {
            removed.extend(file.ids(Group::Removed, mime));
            added.extend(
                file.ids(Group::Added, mime)
                    .into_iter()
                    .filter(|id| !removed.contains(id)),
            );
        }

        defaults.chain(added).unique().collect()
    }
}
