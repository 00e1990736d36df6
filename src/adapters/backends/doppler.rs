use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::adapters::doppler_cli::{is_missing_secret, secrets_get_args, secrets_set_args, DopplerCli};
use crate::domain::models::Registry;
use crate::domain::ports::{BackendError, RegistryBackend};

/// Doppler secret that holds the serialized registry.
pub const METADATA_SECRET: &str = "TOKN_METADATA";

/// Registry stored as a JSON secret in a Doppler project/config, which makes
/// it shared across machines.
pub struct DopplerBackend {
    cli: Arc<dyn DopplerCli>,
    project: String,
    config: String,
}

impl DopplerBackend {
    pub fn new(cli: Arc<dyn DopplerCli>, project: impl Into<String>, config: impl Into<String>) -> Self {
        Self {
            cli,
            project: project.into(),
            config: config.into(),
        }
    }
}

#[async_trait]
impl RegistryBackend for DopplerBackend {
    fn backend_type(&self) -> &str {
        "doppler"
    }

    async fn load_registry(&self) -> Result<Registry, BackendError> {
        let args = secrets_get_args(METADATA_SECRET, Some(&self.project), Some(&self.config));
        let raw = match self.cli.run(&args, None).await {
            Ok(raw) => raw,
            Err(err) if is_missing_secret(&err) => {
                debug!(project = %self.project, config = %self.config, "no registry secret yet");
                return Ok(Registry::new());
            }
            Err(err) => {
                warn!(error = %err, "failed to read registry from doppler");
                return Err(err);
            }
        };

        if raw.is_empty() {
            return Ok(Registry::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    async fn save_registry(&self, registry: &mut Registry) -> Result<(), BackendError> {
        registry.touch();
        let data = serde_json::to_string(registry)?;
        let args = secrets_set_args(METADATA_SECRET, Some(&self.project), Some(&self.config));
        self.cli.run(&args, Some(&data)).await?;

        debug!(project = %self.project, config = %self.config, credentials = registry.len(), "registry saved");
        Ok(())
    }
}
