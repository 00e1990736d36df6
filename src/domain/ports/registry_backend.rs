use async_trait::async_trait;

use crate::domain::models::Registry;
use crate::domain::ports::errors::BackendError;

/// Storage for the credential registry (metadata only, never values).
#[async_trait]
pub trait RegistryBackend: Send + Sync {
    /// Backend identifier (`local`, `doppler`)
    fn backend_type(&self) -> &str;

    /// Load the registry; an absent registry loads as empty.
    async fn load_registry(&self) -> Result<Registry, BackendError>;

    /// Persist the registry, stamping `last_sync` first.
    async fn save_registry(&self, registry: &mut Registry) -> Result<(), BackendError>;

    /// Fetch the latest registry. Remote backends may refresh here.
    async fn sync(&self) -> Result<Registry, BackendError> {
        self.load_registry().await
    }
}
