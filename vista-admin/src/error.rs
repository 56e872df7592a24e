use thiserror::Error;

/// Console usage errors. Request failures never surface here; screens turn
/// them into notifications and placeholders.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Invalid field assignment '{0}', expected key=value")]
    InvalidAssignment(String),

    #[error("No enabled control '{key}' on the {screen} screen")]
    UnknownTrigger { screen: String, key: String },

    #[error("Could not read upload {path}: {source}")]
    Upload {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
