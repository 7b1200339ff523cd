use crate::engine::Request;
use crate::error::DootiError;
use crate::scope::Scope;
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Candidate config locations, relative to the XDG config home, in lookup order.
const SEARCH_PATHS: [&str; 6] = [
    "dooti.yaml",
    "dooti.yml",
    "dooti/dooti.yaml",
    "dooti/dooti.yml",
    "dooti/config.yaml",
    "dooti/config.yml",
];

const SECTIONS: [&str; 4] = ["ext", "scheme", "uti", "app"];

/// Declarative handler assignments consumed by `apply`.
///
/// ```yaml
/// ext:
///   md: com.microsoft.VSCode
/// scheme:
///   ftp: Transmit
/// app:
///   Preview:
///     ext: [pdf, png]
///     uti: [public.jpeg]
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct Definitions {
    #[serde(default)]
    pub ext: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub scheme: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub uti: Option<BTreeMap<String, String>>,
    /// Targets grouped by handler.
    #[serde(default)]
    pub app: Option<BTreeMap<String, AppTargets>>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct AppTargets {
    #[serde(default)]
    pub ext: Option<Vec<String>>,
    #[serde(default)]
    pub scheme: Option<Vec<String>>,
    #[serde(default)]
    pub uti: Option<Vec<String>>,
}

impl AppTargets {
    fn scope(&self, scope: Scope) -> Option<&Vec<String>> {
        match scope {
            Scope::Extension => self.ext.as_ref(),
            Scope::Scheme => self.scheme.as_ref(),
            Scope::Uti => self.uti.as_ref(),
        }
    }
}

impl Definitions {
    pub fn load(path: &Path) -> Result<Self, DootiError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            DootiError::InvalidConfig(format!(
                "Could not read configuration `{}`: {err}",
                path.display()
            ))
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, DootiError> {
        let document: serde_yaml::Value = serde_yaml::from_str(contents)
            .map_err(|err| DootiError::InvalidConfig(format!("Invalid configuration: {err}")))?;

        let Some(mapping) = document.as_mapping() else {
            return Err(DootiError::InvalidConfig(
                "Invalid configuration, must be a dictionary.".into(),
            ));
        };
        if !SECTIONS.iter().any(|section| mapping.contains_key(*section)) {
            return Err(DootiError::InvalidConfig(
                "Configuration does not contain any actionable definitions.".into(),
            ));
        }

        serde_yaml::from_value(document)
            .map_err(|err| DootiError::InvalidConfig(format!("Invalid configuration: {err}")))
    }

    fn section(&self, scope: Scope) -> Option<&BTreeMap<String, String>> {
        match scope {
            Scope::Extension => self.ext.as_ref(),
            Scope::Scheme => self.scheme.as_ref(),
            Scope::Uti => self.uti.as_ref(),
        }
    }

    /// Requests in application order: every `ext`, `scheme` and `uti` entry
    /// on its own, then each `app` group split by scope.
    pub fn requests(&self) -> Vec<Request> {
        let mut requests = Vec::new();

        for scope in Scope::ALL {
            for (target, handler) in self.section(scope).into_iter().flatten() {
                requests.push(Request {
                    scope,
                    targets: vec![target.clone()],
                    handler: handler.clone(),
                });
            }
        }

        for (handler, targets) in self.app.iter().flatten() {
            for scope in Scope::ALL {
                if let Some(targets) = targets.scope(scope) {
                    requests.push(Request {
                        scope,
                        targets: targets.clone(),
                        handler: handler.clone(),
                    });
                }
            }
        }

        requests
    }
}

/// Locate the config file: `file` if given, otherwise the first existing
/// candidate under `config_home`.
pub fn find_config(file: Option<&Path>, config_home: &Path) -> Result<PathBuf, DootiError> {
    if let Some(file) = file {
        if !file.exists() {
            return Err(DootiError::ConfigFileMissing(file.to_path_buf()));
        }
        return Ok(file.to_path_buf());
    }

    for candidate in SEARCH_PATHS.iter().map(|rel| config_home.join(rel)) {
        if candidate.exists() {
            debug!("Using configuration {}", candidate.display());
            return Ok(candidate);
        }
        debug!("No configuration at {}", candidate.display());
    }

    Err(DootiError::ConfigNotFound(config_home.to_path_buf()))
}
