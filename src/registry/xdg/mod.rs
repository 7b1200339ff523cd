//! Freedesktop.org associations: type identifiers are MIME types, schemes
//! live under `x-scheme-handler/<scheme>` and handlers are desktop entries.

use super::{is_dynamic, HandlerKey, Registry, DYNAMIC_PREFIX};
use crate::xdg::XdgDirs;
use anyhow::{bail, Result};
use itertools::Itertools;
use log::{debug, warn};
use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use url::Url;

mod applications;
mod associations;
mod desktop_entry;
mod mimeapps;

use applications::{bundle_to_desktop_id, desktop_id, ApplicationIndex};
use associations::MimeAssociations;
use mimeapps::MimeApps;

const SCHEME_PREFIX: &str = "x-scheme-handler/";

#[derive(Debug)]
pub struct XdgRegistry {
    dirs: XdgDirs,
    apps: OnceCell<ApplicationIndex>,
    associations: OnceCell<MimeAssociations>,
}

impl XdgRegistry {
    pub fn new(dirs: XdgDirs) -> Self {
        Self {
            dirs,
            apps: OnceCell::new(),
            associations: OnceCell::new(),
        }
    }

    fn apps(&self) -> &ApplicationIndex {
        self.apps
            .get_or_init(|| ApplicationIndex::scan(&self.dirs.application_dirs()))
    }

    fn associations(&self) -> &MimeAssociations {
        self.associations
            .get_or_init(|| MimeAssociations::load(&self.dirs.mimeapps_files()))
    }

    /// Desktop file ID to record for a handler location.
    fn desktop_id_for(&self, app: &Path) -> String {
        if let Some(installed) = self.apps().by_path(app) {
            return installed.id.clone();
        }

        self.dirs
            .application_dirs()
            .iter()
            .find_map(|dir| desktop_id(dir, app))
            .unwrap_or_else(|| {
                app.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| app.to_string_lossy().into_owned())
            })
    }
}

/// The `mimeapps.list` key for a registry key.
fn table_key(key: HandlerKey<'_>) -> Result<String> {
    match key {
        HandlerKey::Type(type_id) => {
            if !is_dynamic(type_id) && type_id.parse::<mime::Mime>().is_err() {
                bail!("'{type_id}' is not a valid MIME type");
            }
            Ok(type_id.to_string())
        }
        HandlerKey::Scheme(scheme) => {
            if Url::parse(&format!("{scheme}://nonexistant")).is_err() {
                bail!("'{scheme}' is not a valid URI scheme");
            }
            Ok(format!("{SCHEME_PREFIX}{scheme}"))
        }
    }
}

impl Registry for XdgRegistry {
    fn handler_for(&self, key: HandlerKey<'_>) -> Result<Option<PathBuf>> {
        let table_key = table_key(key)?;

        for desktop_id in self.associations().candidates(&table_key) {
            match self.apps().by_id(desktop_id) {
                Some(app) => return Ok(Some(app.path.clone())),
                None => debug!("Associated handler {desktop_id} for {key} is not installed"),
            }
        }

        Ok(None)
    }

    fn set_handler(&self, key: HandlerKey<'_>, app: &Path) {
        let table_key = match table_key(key) {
            Ok(table_key) => table_key,
            Err(err) => {
                warn!("Not setting handler for {key}: {err:#}");
                return;
            }
        };
        let desktop_id = self.desktop_id_for(app);
        let path = self.dirs.user_mimeapps();
        debug!("Writing {table_key}={desktop_id} to {}", path.display());

        let outcome = MimeApps::load_from_disk(&path).and_then(|mut apps| {
            apps.set_default(&table_key, &desktop_id);
            apps.save_to_disk(&path)
        });
        if let Err(err) = outcome {
            warn!("Could not record handler for {key}: {err:#}");
        }
    }

    fn bundle_path(&self, bundle_id: &str) -> Result<Option<PathBuf>> {
        let desktop_id = bundle_to_desktop_id(bundle_id);
        Ok(self.apps().by_id(&desktop_id).map(|app| app.path.clone()))
    }

    fn application_path(&self, name: &str) -> Result<Option<PathBuf>> {
        Ok(self.apps().by_name(name).map(|app| app.path.clone()))
    }

    fn extension_types(&self, ext: &str) -> Result<Vec<String>> {
        let types: Vec<String> = mime_guess::from_ext(ext)
            .iter()
            .map(|mime| mime.essence_str().to_string())
            .unique()
            .collect();

        if types.is_empty() {
            return Ok(vec![format!("{DYNAMIC_PREFIX}{ext}")]);
        }
        Ok(types)
    }
}
