//! Registry backends and their selection by configuration.

pub mod doppler;
pub mod local;

use std::sync::Arc;

use tracing::info;

use crate::adapters::doppler_cli::DopplerCli;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Config;
use crate::domain::ports::RegistryBackend;

pub use doppler::{DopplerBackend, METADATA_SECRET};
pub use local::LocalBackend;

pub const SUPPORTED_BACKENDS: &[&str] = &["local", "doppler"];

/// Build the backend named `backend_type` using its section of `config`.
pub fn create_backend(
    backend_type: &str,
    config: &Config,
    doppler: Arc<dyn DopplerCli>,
) -> DomainResult<Arc<dyn RegistryBackend>> {
    match backend_type {
        "local" => Ok(Arc::new(LocalBackend::new(&config.local.data_dir))),
        "doppler" => Ok(Arc::new(DopplerBackend::new(
            doppler,
            config.doppler.project.clone(),
            config.doppler.config.clone(),
        ))),
        other => Err(DomainError::UnknownBackend(other.to_string())),
    }
}

/// The backend currently selected in `config`.
pub fn backend_from_config(
    config: &Config,
    doppler: Arc<dyn DopplerCli>,
) -> DomainResult<Arc<dyn RegistryBackend>> {
    create_backend(&config.backend, config, doppler)
}

/// Copy the registry from one backend to another and select the destination.
///
/// Returns the number of credentials copied. The caller persists `config`.
pub async fn migrate_backend(
    from: &str,
    to: &str,
    config: &mut Config,
    doppler: Arc<dyn DopplerCli>,
) -> DomainResult<usize> {
    if from == to {
        return Err(DomainError::ValidationFailed(format!(
            "Source and destination are the same: {from}"
        )));
    }

    let source = create_backend(from, config, doppler.clone())?;
    let destination = create_backend(to, config, doppler)?;

    let mut registry = source.load_registry().await?;
    if registry.is_empty() {
        return Err(DomainError::ValidationFailed(format!(
            "No credentials found in {from} backend"
        )));
    }

    let count = registry.len();
    destination.save_registry(&mut registry).await?;
    config.backend = to.to_string();

    info!(from, to, count, "registry migrated");
    Ok(count)
}
