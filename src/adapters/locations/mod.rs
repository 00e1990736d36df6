//! Location handlers: where credential values live.

pub mod doppler;
pub mod edgerc;
pub mod git_credentials;
pub mod linode_cli;
pub mod postman_env;
pub mod terraform_credentials;

use std::io;
use std::sync::Arc;

use reqwest::Client;
use tracing::warn;

use crate::adapters::doppler_cli::DopplerCli;
use crate::adapters::secure_file::{expand_path, read_optional, write_secure};
use crate::domain::ports::LocationHandler;
use crate::services::LocationHandlerRegistry;

pub use doppler::DopplerLocationHandler;
pub use edgerc::{EdgercFile, EdgercHandler};
pub use git_credentials::GitCredentialsHandler;
pub use linode_cli::LinodeCliHandler;
pub use postman_env::PostmanEnvironmentHandler;
pub use terraform_credentials::TerraformCredentialsHandler;

/// Every built-in handler, keyed by location kind.
pub fn build_default_handlers(http: Client, doppler: Arc<dyn DopplerCli>) -> LocationHandlerRegistry {
    let handlers: Vec<Arc<dyn LocationHandler>> = vec![
        Arc::new(GitCredentialsHandler),
        Arc::new(LinodeCliHandler),
        Arc::new(TerraformCredentialsHandler),
        Arc::new(EdgercHandler),
        Arc::new(DopplerLocationHandler::new(doppler)),
        Arc::new(PostmanEnvironmentHandler::new(http)),
    ];

    handlers
        .into_iter()
        .map(|handler| (handler.kind().to_string(), handler))
        .collect()
}

/// Whole-file snapshot used by file-backed handlers.
pub(crate) async fn backup_file(path: &str) -> Option<String> {
    match read_optional(&expand_path(path)).await {
        Ok(contents) => contents,
        Err(err) => {
            warn!(path, error = %err, "could not snapshot file");
            None
        }
    }
}

/// Put a whole-file snapshot back, with owner-only permissions.
pub(crate) async fn restore_file(path: &str, snapshot: &str) -> bool {
    store_file(path, snapshot).await
}

/// Current contents for a rewrite: `Ok(None)` only when the file does not
/// exist. Anything else unreadable (non-UTF-8, a directory, no permission)
/// is an error so callers never replace a file they could not parse.
pub(crate) async fn load_file(path: &str) -> io::Result<Option<String>> {
    read_optional(&expand_path(path)).await.inspect_err(|err| {
        warn!(path, error = %err, "could not read file");
    })
}

/// Contents for a lookup; unreadable and missing files both read as absent.
pub(crate) async fn read_file(path: &str) -> Option<String> {
    load_file(path).await.ok().flatten()
}

pub(crate) async fn store_file(path: &str, contents: &str) -> bool {
    match write_secure(&expand_path(path), contents).await {
        Ok(()) => true,
        Err(err) => {
            warn!(path, error = %err, "could not write file");
            false
        }
    }
}
