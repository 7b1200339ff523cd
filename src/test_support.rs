#![cfg(test)]

use crate::consent::Consent;
use crate::engine::ChangeSet;
use crate::registry::{HandlerKey, Registry, DYNAMIC_PREFIX};
use anyhow::Result;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// In-memory association table that counts how it is used.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    types: RefCell<HashMap<String, PathBuf>>,
    schemes: RefCell<HashMap<String, PathBuf>>,
    bundles: HashMap<String, PathBuf>,
    apps: HashMap<String, PathBuf>,
    extensions: HashMap<String, Vec<String>>,
    fail_bundle_lookups: bool,
    reads: Cell<usize>,
    bundle_lookups: Cell<usize>,
    name_lookups: Cell<usize>,
    type_lookups: Cell<usize>,
    writes: RefCell<Vec<(String, PathBuf)>>,
}

impl MemoryRegistry {
    pub fn with_type_handler(self, type_id: &str, app: &str) -> Self {
        self.types
            .borrow_mut()
            .insert(type_id.to_string(), PathBuf::from(app));
        self
    }

    pub fn with_scheme_handler(self, scheme: &str, app: &str) -> Self {
        self.schemes
            .borrow_mut()
            .insert(scheme.to_string(), PathBuf::from(app));
        self
    }

    pub fn with_bundle(mut self, bundle_id: &str, app: &str) -> Self {
        self.bundles.insert(bundle_id.to_string(), PathBuf::from(app));
        self
    }

    pub fn with_app(mut self, name: &str, app: &str) -> Self {
        self.apps.insert(name.to_string(), PathBuf::from(app));
        self
    }

    pub fn with_extension(mut self, ext: &str, types: &[&str]) -> Self {
        self.extensions.insert(
            ext.to_string(),
            types.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub fn failing_bundle_lookups(mut self) -> Self {
        self.fail_bundle_lookups = true;
        self
    }

    /// Registry calls of any kind other than writes.
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    pub fn bundle_lookups(&self) -> usize {
        self.bundle_lookups.get()
    }

    pub fn name_lookups(&self) -> usize {
        self.name_lookups.get()
    }

    pub fn type_lookups(&self) -> usize {
        self.type_lookups.get()
    }

    /// Every write so far, as (`HandlerKey` display, application).
    pub fn writes(&self) -> Vec<(String, PathBuf)> {
        self.writes.borrow().clone()
    }

    fn count_read(&self) {
        self.reads.set(self.reads.get() + 1);
    }
}

impl Registry for MemoryRegistry {
    fn handler_for(&self, key: HandlerKey<'_>) -> Result<Option<PathBuf>> {
        self.count_read();
        Ok(match key {
            HandlerKey::Type(type_id) => self.types.borrow().get(type_id).cloned(),
            HandlerKey::Scheme(scheme) => self.schemes.borrow().get(scheme).cloned(),
        })
    }

    fn set_handler(&self, key: HandlerKey<'_>, app: &Path) {
        self.writes
            .borrow_mut()
            .push((key.to_string(), app.to_path_buf()));
        match key {
            HandlerKey::Type(type_id) => self
                .types
                .borrow_mut()
                .insert(type_id.to_string(), app.to_path_buf()),
            HandlerKey::Scheme(scheme) => self
                .schemes
                .borrow_mut()
                .insert(scheme.to_string(), app.to_path_buf()),
        };
    }

    fn bundle_path(&self, bundle_id: &str) -> Result<Option<PathBuf>> {
        self.count_read();
        self.bundle_lookups.set(self.bundle_lookups.get() + 1);
        if self.fail_bundle_lookups {
            anyhow::bail!("LaunchServices is unavailable");
        }
        Ok(self.bundles.get(bundle_id).cloned())
    }

    fn application_path(&self, name: &str) -> Result<Option<PathBuf>> {
        self.count_read();
        self.name_lookups.set(self.name_lookups.get() + 1);
        Ok(self.apps.get(name).cloned())
    }

    fn extension_types(&self, ext: &str) -> Result<Vec<String>> {
        self.count_read();
        self.type_lookups.set(self.type_lookups.get() + 1);
        Ok(self
            .extensions
            .get(ext)
            .cloned()
            .unwrap_or_else(|| vec![format!("{DYNAMIC_PREFIX}{ext}")]))
    }
}

/// Answers every consent prompt the same way and remembers what it was shown.
#[derive(Debug)]
pub struct ScriptedConsent {
    answer: bool,
    pub prompts: Vec<ChangeSet>,
}

impl ScriptedConsent {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Vec::new(),
        }
    }
}

impl Consent for ScriptedConsent {
    fn confirm(&mut self, pending: &ChangeSet) -> bool {
        self.prompts.push(pending.clone());
        self.answer
    }
}

/// Sets or clears an environment variable for the lifetime of the guard.
pub struct EnvGuard {
    key: &'static str,
    original: Option<OsString>,
}

impl EnvGuard {
    pub fn set(key: &'static str, value: impl AsRef<OsStr>) -> Self {
        let original = env::var_os(key);
        env::set_var(key, value);
        Self { key, original }
    }

    pub fn unset(key: &'static str) -> Self {
        let original = env::var_os(key);
        env::remove_var(key);
        Self { key, original }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            env::set_var(self.key, original);
        } else {
            env::remove_var(self.key);
        }
    }
}
