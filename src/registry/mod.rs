//! The operating system's association table, reduced to the handful of
//! lookups and writes reconciliation needs.

use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(target_os = "macos")]
mod launch_services;
#[cfg(not(target_os = "macos"))]
mod xdg;

#[cfg(target_os = "macos")]
pub use launch_services::LaunchServicesRegistry;
#[cfg(not(target_os = "macos"))]
pub use xdg::XdgRegistry;

/// Prefix the platform uses for placeholder type identifiers of unregistered extensions.
pub const DYNAMIC_PREFIX: &str = "dyn.";

/// A key of the association table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKey<'a> {
    /// A type identifier (UTI, or MIME type on XDG desktops).
    Type(&'a str),
    /// A URI scheme without the trailing `:`.
    Scheme(&'a str),
}

impl fmt::Display for HandlerKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerKey::Type(uti) => write!(f, "type {uti}"),
            HandlerKey::Scheme(scheme) => write!(f, "scheme {scheme}"),
        }
    }
}

pub trait Registry {
    /// Location of the default handler for `key`, `None` when nothing is registered.
    fn handler_for(&self, key: HandlerKey<'_>) -> Result<Option<PathBuf>>;

    /// Make `app` the default handler for `key`.
    ///
    /// Writes are fire and forget: the platform completes them
    /// asynchronously and never reports back, so neither does this.
    fn set_handler(&self, key: HandlerKey<'_>, app: &Path);

    /// Location of the application with this bundle identifier, `None` if no
    /// such bundle is installed.
    fn bundle_path(&self, bundle_id: &str) -> Result<Option<PathBuf>>;

    /// Location of the installed application with exactly this display name.
    fn application_path(&self, name: &str) -> Result<Option<PathBuf>>;

    /// Type identifiers registered for a filename extension, in registry
    /// order. Unregistered extensions yield a single dynamic identifier.
    fn extension_types(&self, ext: &str) -> Result<Vec<String>>;
}

pub fn is_dynamic(type_id: &str) -> bool {
    type_id.starts_with(DYNAMIC_PREFIX)
}

/// Remembers the type identifiers of every extension looked up through it;
/// all other operations go straight to the wrapped registry.
pub struct TypeCache<'r> {
    inner: &'r dyn Registry,
    types: RefCell<HashMap<String, Vec<String>>>,
}

impl<'r> TypeCache<'r> {
    pub fn new(inner: &'r dyn Registry) -> Self {
        Self {
            inner,
            types: RefCell::new(HashMap::new()),
        }
    }
}

impl Registry for TypeCache<'_> {
    fn handler_for(&self, key: HandlerKey<'_>) -> Result<Option<PathBuf>> {
        self.inner.handler_for(key)
    }

    fn set_handler(&self, key: HandlerKey<'_>, app: &Path) {
        self.inner.set_handler(key, app)
    }

    fn bundle_path(&self, bundle_id: &str) -> Result<Option<PathBuf>> {
        self.inner.bundle_path(bundle_id)
    }

    fn application_path(&self, name: &str) -> Result<Option<PathBuf>> {
        self.inner.application_path(name)
    }

    fn extension_types(&self, ext: &str) -> Result<Vec<String>> {
        if let Some(types) = self.types.borrow().get(ext) {
            return Ok(types.clone());
        }

        let types = self.inner.extension_types(ext)?;
        self.types
            .borrow_mut()
            .insert(ext.to_owned(), types.clone());
        Ok(types)
    }
}

/// The registry backing the current platform.
pub fn platform() -> Box<dyn Registry> {
    #[cfg(target_os = "macos")]
    {
        Box::new(LaunchServicesRegistry::new())
    }
    #[cfg(not(target_os = "macos"))]
    {
        Box::new(XdgRegistry::new(crate::xdg::XdgDirs::from_env()))
    }
}
