use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const MAIN_SECTION: &str = "[Desktop Entry]";

/// The `[Desktop Entry]` keys needed to pick an installed application by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesktopEntry {
    pub name: String,
    pub hidden: bool,
}

impl DesktopEntry {
    pub fn parse(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read desktop file: {}", path.display()))?;
        Self::parse_str(&contents)
            .with_context(|| format!("Invalid desktop file: {}", path.display()))
    }

    pub fn parse_str(contents: &str) -> Result<Self> {
        let mut in_main_section = false;
        let mut seen_main_section = false;
        let mut fields: HashMap<&str, &str> = HashMap::new();

        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                in_main_section = line == MAIN_SECTION;
                seen_main_section |= in_main_section;
                continue;
            }

            if !in_main_section {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                fields.entry(key.trim()).or_insert(value.trim());
            }
        }

        if !seen_main_section {
            anyhow::bail!("Missing {MAIN_SECTION} section");
        }

        let name = parse_optional_string(fields.get("Name"))
            .ok_or_else(|| anyhow::anyhow!("Missing Name field"))?;

        Ok(Self {
            name,
            hidden: parse_bool(fields.get("Hidden")),
        })
    }
}

fn parse_bool(value: Option<&&str>) -> bool {
    value.is_some_and(|s| s.trim().eq_ignore_ascii_case("true"))
}

fn parse_optional_string(value: Option<&&str>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_simple_desktop_file() {
        let content = r"[Desktop Entry]
Name=Test App
Exec=testapp %F
MimeType=text/plain;text/html;
NoDisplay=false";

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{content}").unwrap();

        let entry = DesktopEntry::parse(temp_file.path()).unwrap();
        assert_eq!(entry.name, "Test App");
        assert!(!entry.hidden);
    }

    #[test]
    fn ignores_action_sections_and_localized_names() {
        let content = r"[Desktop Entry]
Name=Editor
Name[de]=Bearbeiter
Hidden=true

[Desktop Action new-window]
Name=New Window
Exec=editor --new-window";

        let entry = DesktopEntry::parse_str(content).unwrap();
        assert_eq!(entry.name, "Editor");
        assert!(entry.hidden);
    }

    #[test]
    fn first_occurrence_of_a_key_wins() {
        let entry = DesktopEntry::parse_str("[Desktop Entry]\nName=First\nName=Second\n").unwrap();
        assert_eq!(entry.name, "First");
    }

    #[test]
    fn rejects_missing_name() {
        let err = DesktopEntry::parse_str("[Desktop Entry]\nExec=foo\n").unwrap_err();
        assert!(err.to_string().contains("Missing Name"));
    }

    #[test]
    fn rejects_files_without_main_section() {
        assert!(DesktopEntry::parse_str("[Desktop Action x]\nName=X\n").is_err());
    }
}
