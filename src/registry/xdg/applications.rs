use super::desktop_entry::DesktopEntry;
use log::debug;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const DESKTOP_SUFFIX: &str = ".desktop";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledApp {
    /// Desktop file ID, e.g. `org.gnome.Evince.desktop`.
    pub id: String,
    pub path: PathBuf,
    pub entry: DesktopEntry,
}

/// Installed applications, keyed by desktop file ID. When the same ID is
/// present in several directories, the most specific directory wins.
#[derive(Debug, Default)]
pub struct ApplicationIndex {
    apps: Vec<InstalledApp>,
}

impl ApplicationIndex {
    pub fn scan(application_dirs: &[PathBuf]) -> Self {
        let mut apps = Vec::new();
        let mut seen = HashSet::new();

        for dir in application_dirs {
            for entry in WalkDir::new(dir)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| {
                    e.depth() == 0
                        || e.file_name()
                            .to_str()
                            .map(|s| !s.starts_with('.'))
                            .unwrap_or(false)
                })
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !entry.file_type().is_file() {
                    continue;
                }

                let Some(id) = desktop_id(dir, path) else {
                    continue;
                };

                if !seen.insert(id.clone()) {
                    continue;
                }

                match DesktopEntry::parse(path) {
                    Ok(desktop_entry) => apps.push(InstalledApp {
                        id,
                        path: path.to_path_buf(),
                        entry: desktop_entry,
                    }),
                    Err(e) => debug!("Skipping {}: {e:#}", path.display()),
                }
            }
        }

        debug!("Indexed {} desktop files", apps.len());
        Self { apps }
    }

    #[cfg(test)]
    pub fn from_apps(apps: Vec<InstalledApp>) -> Self {
        Self { apps }
    }

    pub fn by_id(&self, desktop_id: &str) -> Option<&InstalledApp> {
        self.apps.iter().find(|app| app.id == desktop_id)
    }

    pub fn by_name(&self, name: &str) -> Option<&InstalledApp> {
        self.apps
            .iter()
            .find(|app| !app.entry.hidden && app.entry.name == name)
    }

    pub fn by_path(&self, path: &Path) -> Option<&InstalledApp> {
        self.apps.iter().find(|app| app.path == path)
    }
}

/// Desktop file ID of `path` below `dir`: the relative path with `/`
/// replaced by `-`, as defined by the desktop entry specification.
pub fn desktop_id(dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(dir).ok()?;
    let id = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?
        .join("-");
    id.ends_with(DESKTOP_SUFFIX).then_some(id)
}

/// Normalize a bundle-style reference (`org.gnome.Evince`) to a desktop file ID.
pub fn bundle_to_desktop_id(bundle_id: &str) -> String {
    if bundle_id.ends_with(DESKTOP_SUFFIX) {
        bundle_id.to_string()
    } else {
        format!("{bundle_id}{DESKTOP_SUFFIX}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_app(dir: &Path, relative: &str, name: &str) -> PathBuf {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("[Desktop Entry]\nName={name}\nExec=true\n")).unwrap();
        path
    }

    #[test]
    fn desktop_ids_flatten_subdirectories() {
        let dir = Path::new("/usr/share/applications");
        assert_eq!(
            desktop_id(dir, &dir.join("kde4/okular.desktop")).as_deref(),
            Some("kde4-okular.desktop")
        );
        assert_eq!(desktop_id(dir, &dir.join("notes.txt")), None);
        assert_eq!(desktop_id(dir, Path::new("/elsewhere/a.desktop")), None);
    }

    #[test]
    fn bundle_ids_gain_desktop_suffix_once() {
        assert_eq!(bundle_to_desktop_id("org.gnome.Evince"), "org.gnome.Evince.desktop");
        assert_eq!(bundle_to_desktop_id("firefox.desktop"), "firefox.desktop");
    }

    #[test]
    fn scan_prefers_the_first_directory() {
        let user = TempDir::new().unwrap();
        let system = TempDir::new().unwrap();
        let user_copy = write_app(user.path(), "org.gnome.Evince.desktop", "My Evince");
        write_app(system.path(), "org.gnome.Evince.desktop", "Document Viewer");
        write_app(system.path(), "kde4/okular.desktop", "Okular");

        let index =
            ApplicationIndex::scan(&[user.path().to_path_buf(), system.path().to_path_buf()]);

        let evince = index.by_id("org.gnome.Evince.desktop").unwrap();
        assert_eq!(evince.path, user_copy);
        assert!(index.by_name("Document Viewer").is_none());
        assert_eq!(index.by_name("Okular").unwrap().id, "kde4-okular.desktop");
        assert!(index.by_path(&user_copy).is_some());
    }

    #[test]
    fn scan_skips_unparsable_and_hidden_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.desktop"), "no sections here").unwrap();
        fs::write(dir.path().join(".hidden.desktop"), "[Desktop Entry]\nName=Ghost\n").unwrap();

        let index = ApplicationIndex::scan(&[dir.path().to_path_buf()]);
        assert!(index.by_id("broken.desktop").is_none());
        assert!(index.by_name("Ghost").is_none());
    }

    #[test]
    fn name_lookup_ignores_hidden_entries() {
        let index = ApplicationIndex::from_apps(vec![InstalledApp {
            id: "gone.desktop".into(),
            path: PathBuf::from("/usr/share/applications/gone.desktop"),
            entry: DesktopEntry {
                name: "Gone".into(),
                hidden: true,
            },
        }]);
        assert!(index.by_name("Gone").is_none());
        assert!(index.by_id("gone.desktop").is_some());
    }
}
