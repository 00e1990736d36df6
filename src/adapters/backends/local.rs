use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::adapters::secure_file::{expand_path, read_optional, write_secure};
use crate::domain::models::Registry;
use crate::domain::ports::{BackendError, RegistryBackend};

pub const REGISTRY_FILENAME: &str = "registry.json";

/// Registry stored as pretty JSON in `{data_dir}/registry.json`.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    registry_file: PathBuf,
}

impl LocalBackend {
    pub fn new(data_dir: &str) -> Self {
        Self {
            registry_file: expand_path(data_dir).join(REGISTRY_FILENAME),
        }
    }

    pub fn registry_file(&self) -> &Path {
        &self.registry_file
    }
}

#[async_trait]
impl RegistryBackend for LocalBackend {
    fn backend_type(&self) -> &str {
        "local"
    }

    async fn load_registry(&self) -> Result<Registry, BackendError> {
        let contents = read_optional(&self.registry_file)
            .await
            .map_err(|e| BackendError::io(&self.registry_file, e))?;

        match contents {
            None => Ok(Registry::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Registry::new()),
            Some(raw) => Ok(serde_json::from_str(&raw)?),
        }
    }

    async fn save_registry(&self, registry: &mut Registry) -> Result<(), BackendError> {
        registry.touch();
        let data = serde_json::to_string_pretty(registry)?;
        write_secure(&self.registry_file, &data)
            .await
            .map_err(|e| BackendError::io(&self.registry_file, e))?;

        debug!(path = %self.registry_file.display(), credentials = registry.len(), "registry saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CredentialLocation, CredentialRecord, RotationType};
    use tempfile::TempDir;

    fn backend(dir: &TempDir) -> LocalBackend {
        LocalBackend::new(dir.path().to_str().unwrap())
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let registry = backend(&dir).load_registry().await.unwrap();
        assert!(registry.is_empty());
        assert!(registry.last_sync.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let backend = backend(&dir);

        let mut registry = Registry::new();
        registry.upsert(CredentialRecord::new(
            "cf",
            "cloudflare",
            RotationType::Auto,
            vec![CredentialLocation::new("doppler", "CF_TOKEN")],
        ));
        backend.save_registry(&mut registry).await.unwrap();
        assert!(registry.last_sync.is_some());

        let loaded = backend.load_registry().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("cf").unwrap().service, "cloudflare");
        assert!(loaded.last_sync.is_some());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let backend = backend(&dir);
        std::fs::write(backend.registry_file(), "{not json").unwrap();

        let err = backend.load_registry().await.unwrap_err();
        assert!(matches!(err, BackendError::Parse(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_registry_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let backend = backend(&dir);
        backend.save_registry(&mut Registry::new()).await.unwrap();

        let mode = std::fs::metadata(backend.registry_file()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
