//! Namespace-specific steps of reconciliation.

use crate::error::DootiError;
use crate::registry::{is_dynamic, HandlerKey, Registry};
use std::fmt;
use std::path::{Path, PathBuf};

/// The three namespaces handlers are managed in.
///
/// Reconciliation is the same for all of them; this type carries the
/// namespace-specific steps: validating an identifier, reading its current
/// handler, deciding whether it may be changed, and writing the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    Extension,
    Scheme,
    Uti,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Extension, Scope::Scheme, Scope::Uti];

    /// Singular noun used in prompts.
    pub fn noun(self) -> &'static str {
        match self {
            Scope::Extension => "extension",
            Scope::Scheme => "scheme",
            Scope::Uti => "uti",
        }
    }

    pub fn validate(self, identifier: &str) -> Result<(), DootiError> {
        match self {
            Scope::Scheme if identifier == "file" => Err(DootiError::InvalidSchemeQuery),
            _ => Ok(()),
        }
    }

    /// Current handler of `identifier`.
    ///
    /// Extensions report the handler of the first type identifier the
    /// registry maps them to.
    pub fn current(
        self,
        registry: &dyn Registry,
        identifier: &str,
    ) -> Result<Option<PathBuf>, DootiError> {
        self.validate(identifier)?;

        let handler = match self {
            Scope::Extension => match registry.extension_types(identifier)?.first() {
                Some(type_id) => registry.handler_for(HandlerKey::Type(type_id))?,
                None => None,
            },
            Scope::Scheme => registry.handler_for(HandlerKey::Scheme(identifier))?,
            Scope::Uti => registry.handler_for(HandlerKey::Type(identifier))?,
        };
        Ok(handler)
    }

    /// Why `identifier` may not be changed, if it may not.
    ///
    /// Only extensions are ever refused: those without a registered type
    /// identifier, unless dynamic identifiers are allowed.
    pub fn refusal(
        self,
        registry: &dyn Registry,
        identifier: &str,
        allow_dynamic: bool,
    ) -> Result<Option<DootiError>, DootiError> {
        if self != Scope::Extension {
            return Ok(None);
        }

        let refusal = match registry.extension_types(identifier)?.first() {
            None => Some(DootiError::ExtHasNoTypes(identifier.to_owned())),
            Some(type_id) if is_dynamic(type_id) && !allow_dynamic => {
                Some(DootiError::ExtHasNoRegisteredUti(identifier.to_owned()))
            }
            Some(_) => None,
        };
        Ok(refusal)
    }

    /// Make `handler` the default for `identifier`.
    ///
    /// For extensions every mapped type identifier is updated.
    pub fn apply(
        self,
        registry: &dyn Registry,
        identifier: &str,
        handler: &Path,
    ) -> Result<(), DootiError> {
        self.validate(identifier)?;

        match self {
            Scope::Extension => {
                for type_id in registry.extension_types(identifier)? {
                    registry.set_handler(HandlerKey::Type(&type_id), handler);
                }
            }
            Scope::Scheme => registry.set_handler(HandlerKey::Scheme(identifier), handler),
            Scope::Uti => registry.set_handler(HandlerKey::Type(identifier), handler),
        }
        Ok(())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryRegistry;

    const TEXTEDIT: &str = "/System/Applications/TextEdit.app";

    fn registry() -> MemoryRegistry {
        MemoryRegistry::default()
            .with_extension("txt", &["public.plain-text", "com.example.notes"])
            .with_type_handler("public.plain-text", TEXTEDIT)
            .with_scheme_handler("https", "/Applications/Safari.app")
    }

    #[test]
    fn file_scheme_is_rejected_before_any_lookup() {
        let registry = registry();
        let err = Scope::Scheme.current(&registry, "file").unwrap_err();
        assert!(matches!(err, DootiError::InvalidSchemeQuery));
        assert_eq!(registry.reads(), 0);

        assert!(Scope::Scheme.apply(&registry, "file", Path::new("/x.app")).is_err());
        assert!(registry.writes().is_empty());
    }

    #[test]
    fn file_is_only_special_for_schemes() {
        assert!(Scope::Uti.validate("file").is_ok());
        assert!(Scope::Extension.validate("file").is_ok());
    }

    #[test]
    fn extension_reads_first_type_identifier() {
        let registry = registry();
        assert_eq!(
            Scope::Extension.current(&registry, "txt").unwrap(),
            Some(PathBuf::from(TEXTEDIT))
        );
        assert_eq!(Scope::Uti.current(&registry, "com.example.notes").unwrap(), None);
        assert_eq!(
            Scope::Scheme.current(&registry, "https").unwrap(),
            Some(PathBuf::from("/Applications/Safari.app"))
        );
    }

    #[test]
    fn dynamic_extensions_are_refused_unless_allowed() {
        let registry = registry();

        let refusal = Scope::Extension.refusal(&registry, "fooobaar", false).unwrap();
        assert!(matches!(refusal, Some(DootiError::ExtHasNoRegisteredUti(ref e)) if e == "fooobaar"));

        assert!(Scope::Extension.refusal(&registry, "fooobaar", true).unwrap().is_none());
        assert!(Scope::Extension.refusal(&registry, "txt", false).unwrap().is_none());
        assert!(Scope::Uti.refusal(&registry, "dyn.abc", false).unwrap().is_none());
    }

    #[test]
    fn extensions_without_any_type_are_always_refused() {
        let registry = registry().with_extension("fooo.baar", &[]);
        let refusal = Scope::Extension.refusal(&registry, "fooo.baar", true).unwrap();
        assert!(matches!(refusal, Some(DootiError::ExtHasNoTypes(_))));
    }

    #[test]
    fn applying_an_extension_sets_every_type() {
        let registry = registry();
        Scope::Extension
            .apply(&registry, "txt", Path::new("/System/Applications/Preview.app"))
            .unwrap();

        assert_eq!(
            registry.writes(),
            vec![
                ("type public.plain-text".to_string(), PathBuf::from("/System/Applications/Preview.app")),
                ("type com.example.notes".to_string(), PathBuf::from("/System/Applications/Preview.app")),
            ]
        );
    }
}
