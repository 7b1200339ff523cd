use crate::error::DootiError;
use crate::registry::Registry;
use log::debug;
use std::collections::HashMap;
use std::path::{PathBuf, MAIN_SEPARATOR};

/// Resolves handler references (absolute path, bundle identifier or display
/// name) to application locations.
///
/// Every distinct reference is looked up at most once per resolver; misses
/// are remembered as well.
pub struct HandlerResolver<'r> {
    registry: &'r dyn Registry,
    resolved: HashMap<String, Option<PathBuf>>,
}

impl<'r> HandlerResolver<'r> {
    pub fn new(registry: &'r dyn Registry) -> Self {
        Self {
            registry,
            resolved: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, reference: &str) -> Result<PathBuf, DootiError> {
        let found = match self.resolved.get(reference) {
            Some(found) => found.clone(),
            None => {
                let found = self.lookup(reference)?;
                self.resolved.insert(reference.to_owned(), found.clone());
                found
            }
        };

        found.ok_or_else(|| DootiError::ApplicationNotFound(reference.to_owned()))
    }

    fn lookup(&self, reference: &str) -> Result<Option<PathBuf>, DootiError> {
        if reference.starts_with(MAIN_SEPARATOR) {
            return Ok(Some(PathBuf::from(reference)));
        }

        if let Some(path) = self.registry.bundle_path(reference)? {
            debug!("Resolved bundle {reference} to {}", path.display());
            return Ok(Some(path));
        }
        debug!("There is no bundle with the identifier '{reference}'");

        let path = self.registry.application_path(reference)?;
        match &path {
            Some(path) => debug!("Resolved application {reference} to {}", path.display()),
            None => debug!("Could not find an application named '{reference}'"),
        }
        Ok(path)
    }
}
