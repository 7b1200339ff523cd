use super::{HandlerKey, Registry};
use anyhow::{bail, Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::process::Command;

const PRELUDE: &str = "ObjC.import('AppKit'); ObjC.import('UniformTypeIdentifiers');\n\
const ws = $.NSWorkspace.sharedWorkspace;\n\
function pathOf(url) { return url.isNil() ? '' : url.path.js; }\n";

const HANDLER_FOR_TYPE: &str = "function run(argv) {\n\
  return pathOf(ws.URLForApplicationToOpenContentType($.UTType.importedTypeWithIdentifier(argv[0])));\n\
}";

const HANDLER_FOR_SCHEME: &str = "function run(argv) {\n\
  return pathOf(ws.URLForApplicationToOpenURL($.NSURL.URLWithString(argv[0] + '://nonexistant')));\n\
}";

// The completion handler is left unset; the short delay lets the request
// leave the process before the interpreter exits.
const SET_TYPE_HANDLER: &str = "function run(argv) {\n\
  ws.setDefaultApplicationAtURLToOpenContentTypeCompletionHandler(\n\
    $.NSURL.fileURLWithPath(argv[1]), $.UTType.importedTypeWithIdentifier(argv[0]), null);\n\
  delay(0.1);\n\
  return '';\n\
}";

const SET_SCHEME_HANDLER: &str = "function run(argv) {\n\
  ws.setDefaultApplicationAtURLToOpenURLsWithSchemeCompletionHandler(\n\
    $.NSURL.fileURLWithPath(argv[1]), argv[0], null);\n\
  delay(0.1);\n\
  return '';\n\
}";

const BUNDLE_PATH: &str = "function run(argv) {\n\
  return pathOf(ws.URLForApplicationWithBundleIdentifier(argv[0]));\n\
}";

const APPLICATION_PATH: &str = "function run(argv) {\n\
  const path = ws.fullPathForApplication(argv[0]);\n\
  return path.isNil() ? '' : path.js;\n\
}";

const EXTENSION_TYPES: &str = "function run(argv) {\n\
  const types = $.UTType.typesWithTagTagClassConformingToType(argv[0], 'public.filename-extension', null);\n\
  const ids = [];\n\
  for (let i = 0; i < types.count; i++) { ids.push(types.objectAtIndex(i).identifier.js); }\n\
  return ids.join('\\n');\n\
}";

/// LaunchServices, driven through JavaScript for Automation.
#[derive(Debug, Default)]
pub struct LaunchServicesRegistry;

impl LaunchServicesRegistry {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, body: &str, args: &[&str]) -> Result<String> {
        let script = format!("{PRELUDE}{body}");
        let output = Command::new("osascript")
            .args(["-l", "JavaScript", "-e"])
            .arg(&script)
            .args(args)
            .output()
            .context("Failed to run osascript")?;

        if !output.status.success() {
            bail!(
                "osascript exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn optional_path(&self, body: &str, args: &[&str]) -> Result<Option<PathBuf>> {
        let path = self.run(body, args)?;
        Ok((!path.is_empty()).then(|| PathBuf::from(path)))
    }
}

impl Registry for LaunchServicesRegistry {
    fn handler_for(&self, key: HandlerKey<'_>) -> Result<Option<PathBuf>> {
        debug!("Looking up handler for {key}");
        match key {
            HandlerKey::Type(uti) => self.optional_path(HANDLER_FOR_TYPE, &[uti]),
            HandlerKey::Scheme(scheme) => self.optional_path(HANDLER_FOR_SCHEME, &[scheme]),
        }
    }

    fn set_handler(&self, key: HandlerKey<'_>, app: &Path) {
        debug!("Setting {} as handler for {key}", app.display());
        let app = app.to_string_lossy();
        let outcome = match key {
            HandlerKey::Type(uti) => self.run(SET_TYPE_HANDLER, &[uti, &app]),
            HandlerKey::Scheme(scheme) => self.run(SET_SCHEME_HANDLER, &[scheme, &app]),
        };
        if let Err(err) = outcome {
            warn!("Could not issue handler change for {key}: {err:#}");
        }
    }

    fn bundle_path(&self, bundle_id: &str) -> Result<Option<PathBuf>> {
        self.optional_path(BUNDLE_PATH, &[bundle_id])
    }

    fn application_path(&self, name: &str) -> Result<Option<PathBuf>> {
        self.optional_path(APPLICATION_PATH, &[name])
    }

    fn extension_types(&self, ext: &str) -> Result<Vec<String>> {
        let listing = self.run(EXTENSION_TYPES, &[ext])?;
        Ok(listing
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect())
    }
}
