use std::path::PathBuf;

/// Failures surfaced by handler resolution, reconciliation and config loading.
///
/// The `Display` strings end up verbatim in the `errors` list of the
/// emitted report, so they are written as complete sentences.
#[derive(Debug, thiserror::Error)]
pub enum DootiError {
    #[error("Could not find an application matching the description '{0}'.")]
    ApplicationNotFound(String),

    #[error(
        "No UTI are registered for file extension '{0}'. \
         To force using a dynamic UTI, pass `-u`/`--dynamic`."
    )]
    ExtHasNoRegisteredUti(String),

    #[error("File extension '{0}' does not map to any UTI.")]
    ExtHasNoTypes(String),

    #[error("The file:// scheme cannot be looked up.")]
    InvalidSchemeQuery,

    #[error("Could not find dooti configuration in `{}`.", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Passed dooti configuration file `{}` does not exist.", .0.display())]
    ConfigFileMissing(PathBuf),

    #[error("{0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Registry(#[from] anyhow::Error),
}

impl DootiError {
    /// Errors that only concern a single target and are collected into the
    /// report instead of aborting the invocation.
    pub fn is_per_target(&self) -> bool {
        matches!(
            self,
            DootiError::ApplicationNotFound(_)
                | DootiError::ExtHasNoRegisteredUti(_)
                | DootiError::ExtHasNoTypes(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_extension_message_mentions_flag() {
        let message = DootiError::ExtHasNoRegisteredUti("fooobaar".into()).to_string();
        assert!(message.contains("'fooobaar'"));
        assert!(message.contains("`-u`/`--dynamic`"));
    }

    #[test]
    fn per_target_classification() {
        assert!(DootiError::ApplicationNotFound("Preview".into()).is_per_target());
        assert!(!DootiError::InvalidSchemeQuery.is_per_target());
        assert!(!DootiError::InvalidConfig("nope".into()).is_per_target());
    }
}
