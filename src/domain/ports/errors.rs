use thiserror::Error;

/// Registry backend errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Registry is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Command `{command}` failed: {stderr}")]
    Command { command: String, stderr: String },

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// Errors raised inside provider adapters.
///
/// These never cross the `rotate` boundary; providers convert them into a
/// failed `RotationOutcome`.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} API error: {status}")]
    Status { service: String, status: u16 },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Missing rotation parameter: {0}")]
    MissingParameter(String),

    #[error("{0}")]
    Rejected(String),
}
