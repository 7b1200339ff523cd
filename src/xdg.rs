use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

/// XDG base directories relevant to handler associations and config discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XdgDirs {
    pub config_home: PathBuf,
    pub config_dirs: Vec<PathBuf>,
    pub data_home: PathBuf,
    pub data_dirs: Vec<PathBuf>,
    /// Lowercased entries of `XDG_CURRENT_DESKTOP`.
    pub desktops: Vec<String>,
}

// Only config discovery uses these directories on macOS.
#[cfg_attr(target_os = "macos", allow(dead_code))]
impl XdgDirs {
    pub fn from_env() -> Self {
        let home = dirs::home_dir();

        let config_home = env_path("XDG_CONFIG_HOME").unwrap_or_else(|| {
            home.as_ref()
                .map_or_else(|| PathBuf::from("/tmp"), |h| h.join(".config"))
        });
        let data_home = env_path("XDG_DATA_HOME").unwrap_or_else(|| {
            home.as_ref()
                .map_or_else(|| PathBuf::from("/tmp"), |h| h.join(".local/share"))
        });

        let mut data_dirs = env_list("XDG_DATA_DIRS", "/usr/local/share:/usr/share");
        data_dirs.push(PathBuf::from("/var/lib/flatpak/exports/share"));
        if let Some(home) = &home {
            data_dirs.push(home.join(".local/share/flatpak/exports/share"));
        }

        Self {
            config_home,
            config_dirs: env_list("XDG_CONFIG_DIRS", "/etc/xdg"),
            data_home,
            data_dirs,
            desktops: desktop_environment_names(),
        }
    }

    /// Existing `applications` directories, most specific first.
    pub fn application_dirs(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        let mut seen = HashSet::new();

        for data_dir in std::iter::once(&self.data_home).chain(self.data_dirs.iter()) {
            let apps_dir = data_dir.join("applications");
            if apps_dir.is_dir() && seen.insert(apps_dir.clone()) {
                paths.push(apps_dir);
            }
        }

        paths
    }

    /// Existing `mimeapps.list` files in lookup order (highest precedence first).
    pub fn mimeapps_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let mut push_from = |dir: &Path| {
            for desktop_env in &self.desktops {
                let file = dir.join(format!("{desktop_env}-mimeapps.list"));
                if file.is_file() {
                    files.push(file);
                }
            }
            let file = dir.join("mimeapps.list");
            if file.is_file() {
                files.push(file);
            }
        };

        push_from(&self.config_home);
        for config_dir in &self.config_dirs {
            push_from(config_dir);
        }
        push_from(&self.data_home.join("applications"));
        for data_dir in &self.data_dirs {
            push_from(&data_dir.join("applications"));
        }

        files
    }

    /// The file handler changes are written to.
    pub fn user_mimeapps(&self) -> PathBuf {
        self.config_home.join("mimeapps.list")
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn env_list(key: &str, default: &str) -> Vec<PathBuf> {
    env::var(key)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
        .split(':')
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn desktop_environment_names() -> Vec<String> {
    env::var("XDG_CURRENT_DESKTOP")
        .unwrap_or_default()
        .split(':')
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::EnvGuard;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn dirs_in(root: &Path) -> XdgDirs {
        XdgDirs {
            config_home: root.join("config"),
            config_dirs: vec![root.join("etc/xdg")],
            data_home: root.join("data"),
            data_dirs: vec![root.join("usr/share"), root.join("data")],
            desktops: vec!["gnome".into()],
        }
    }

    #[test]
    #[serial]
    fn desktop_environment_names_are_lowercased() {
        let _guard = EnvGuard::set("XDG_CURRENT_DESKTOP", "GNOME:GTK");
        assert_eq!(desktop_environment_names(), vec!["gnome", "gtk"]);
    }

    #[test]
    #[serial]
    fn desktop_environment_names_empty() {
        let _guard = EnvGuard::unset("XDG_CURRENT_DESKTOP");
        assert!(desktop_environment_names().is_empty());
    }

    #[test]
    #[serial]
    fn from_env_honours_config_home() {
        let tmp = TempDir::new().unwrap();
        let _guard = EnvGuard::set("XDG_CONFIG_HOME", tmp.path());
        assert_eq!(XdgDirs::from_env().config_home, tmp.path());
    }

    #[test]
    #[serial]
    fn from_env_ignores_empty_values() {
        let _guard = EnvGuard::set("XDG_CONFIG_DIRS", "");
        assert_eq!(XdgDirs::from_env().config_dirs, vec![PathBuf::from("/etc/xdg")]);
    }

    #[test]
    fn application_dirs_are_deduplicated_and_existing() {
        let tmp = TempDir::new().unwrap();
        let dirs = dirs_in(tmp.path());
        fs::create_dir_all(tmp.path().join("data/applications")).unwrap();
        fs::create_dir_all(tmp.path().join("usr/share/applications")).unwrap();

        assert_eq!(
            dirs.application_dirs(),
            vec![
                tmp.path().join("data/applications"),
                tmp.path().join("usr/share/applications"),
            ]
        );
    }

    #[test]
    fn mimeapps_files_prefer_desktop_specific_user_files() {
        let tmp = TempDir::new().unwrap();
        let dirs = dirs_in(tmp.path());
        fs::create_dir_all(tmp.path().join("config")).unwrap();
        fs::create_dir_all(tmp.path().join("etc/xdg")).unwrap();
        fs::write(tmp.path().join("config/mimeapps.list"), "").unwrap();
        fs::write(tmp.path().join("config/gnome-mimeapps.list"), "").unwrap();
        fs::write(tmp.path().join("etc/xdg/mimeapps.list"), "").unwrap();

        assert_eq!(
            dirs.mimeapps_files(),
            vec![
                tmp.path().join("config/gnome-mimeapps.list"),
                tmp.path().join("config/mimeapps.list"),
                tmp.path().join("etc/xdg/mimeapps.list"),
            ]
        );
    }

    #[test]
    fn user_mimeapps_lives_in_config_home() {
        let dirs = dirs_in(Path::new("/home/u"));
        assert_eq!(dirs.user_mimeapps(), PathBuf::from("/home/u/config/mimeapps.list"));
    }
}
