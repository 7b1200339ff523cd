use anyhow::{Context, Result};
use itertools::Itertools;
use std::fs;
use std::ops::Range;
use std::path::Path;

const DEFAULT_GROUP: &str = "Default Applications";
const ADDED_GROUP: &str = "Added Associations";
const REMOVED_GROUP: &str = "Removed Associations";

/// The association groups of a `mimeapps.list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Default,
    Added,
    Removed,
}

impl Group {
    fn header(self) -> &'static str {
        match self {
            Group::Default => DEFAULT_GROUP,
            Group::Added => ADDED_GROUP,
            Group::Removed => REMOVED_GROUP,
        }
    }
}

/// One `mimeapps.list` file.
///
/// Kept as its raw lines: edits touch a single entry, so comments, ordering
/// and groups this tool does not manage survive a rewrite.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MimeApps {
    lines: Vec<String>,
}

fn group_header(line: &str) -> Option<&str> {
    line.trim().strip_prefix('[')?.strip_suffix(']')
}

/// `key=value` of an entry line; comments and blanks are not entries.
fn entry(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value))
}

fn desktop_ids(value: &str) -> impl Iterator<Item = &str> {
    value.split(';').map(str::trim).filter(|id| !id.is_empty())
}

impl MimeApps {
    /// Missing files load as empty.
    pub fn load_from_disk(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::parse(&contents))
    }

    pub fn save_to_disk(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, self.to_string_lossless())
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn parse(contents: &str) -> Self {
        Self {
            lines: contents.lines().map(str::to_owned).collect(),
        }
    }

    fn to_string_lossless(&self) -> String {
        let mut contents = self.lines.join("\n");
        contents.push('\n');
        contents
    }

    /// Line ranges of every occurrence of `group`, headers excluded.
    fn group_ranges(&self, group: &str) -> Vec<Range<usize>> {
        let headers: Vec<(usize, &str)> = self
            .lines
            .iter()
            .enumerate()
            .filter_map(|(index, line)| group_header(line).map(|name| (index, name)))
            .collect();

        headers
            .iter()
            .enumerate()
            .filter(|(_, (_, name))| *name == group)
            .map(|(position, (index, _))| {
                let end = headers
                    .get(position + 1)
                    .map_or(self.lines.len(), |(next, _)| *next);
                index + 1..end
            })
            .collect()
    }

    fn group_value(&self, group: &str, mime: &str) -> Option<&str> {
        self.group_ranges(group)
            .into_iter()
            .flatten()
            .filter_map(|index| entry(&self.lines[index]))
            .find(|(key, _)| *key == mime)
            .map(|(_, value)| value)
    }

    /// Desktop IDs listed for `mime` in `group`, without duplicates.
    pub fn ids(&self, group: Group, mime: &str) -> Vec<&str> {
        self.group_value(group.header(), mime)
            .into_iter()
            .flat_map(desktop_ids)
            .unique()
            .collect()
    }

    /// Make `desktop_id` the only default for `mime`.
    pub fn set_default(&mut self, mime: &str, desktop_id: &str) {
        let line = format!("{mime}={desktop_id};");
        let ranges = self.group_ranges(DEFAULT_GROUP);

        let existing = ranges
            .iter()
            .cloned()
            .flatten()
            .find(|&index| entry(&self.lines[index]).is_some_and(|(key, _)| key == mime));
        if let Some(index) = existing {
            self.lines[index] = line;
            return;
        }

        match ranges.first() {
            Some(range) => {
                // After the last entry, ahead of the blank lines separating groups.
                let insert_at = range
                    .clone()
                    .rev()
                    .find(|&index| !self.lines[index].trim().is_empty())
                    .map_or(range.start, |index| index + 1);
                self.lines.insert(insert_at, line);
            }
            None => {
                if self.lines.last().is_some_and(|last| !last.trim().is_empty()) {
                    self.lines.push(String::new());
                }
                self.lines.push(format!("[{DEFAULT_GROUP}]"));
                self.lines.push(line);
            }
        }
    }
}
