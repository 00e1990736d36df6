//! Registry bookkeeping: track, inspect, update, and forget credentials.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CredentialRecord, CredentialStatus, Registry, RotationType};
use crate::domain::ports::RegistryBackend;

/// Changes applied by [`CredentialService::update`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct CredentialUpdate {
    /// Reset the expiry to now + N days
    pub expiry_days: Option<i64>,
    pub notes: Option<String>,
    pub rotation_type: Option<RotationType>,
}

impl CredentialUpdate {
    pub fn is_empty(&self) -> bool {
        self.expiry_days.is_none() && self.notes.is_none() && self.rotation_type.is_none()
    }
}

pub struct CredentialService {
    backend: Arc<dyn RegistryBackend>,
}

impl CredentialService {
    pub fn new(backend: Arc<dyn RegistryBackend>) -> Self {
        Self { backend }
    }

    /// Start tracking a credential. Names are unique.
    pub async fn track(&self, record: CredentialRecord) -> DomainResult<CredentialRecord> {
        record.validate().map_err(DomainError::ValidationFailed)?;

        let mut registry = self.backend.load_registry().await?;
        if registry.contains(&record.name) {
            return Err(DomainError::DuplicateCredential(record.name));
        }

        registry.upsert(record.clone());
        self.backend.save_registry(&mut registry).await?;

        info!(credential = %record.name, service = %record.service, "credential tracked");
        Ok(record)
    }

    pub async fn get(&self, name: &str) -> DomainResult<CredentialRecord> {
        let registry = self.backend.load_registry().await?;
        registry
            .get(name)
            .cloned()
            .ok_or_else(|| DomainError::CredentialNotFound(name.to_string()))
    }

    /// All tracked credentials. With `expiring_only`, ACTIVE ones are left out.
    pub async fn list(&self, expiring_only: bool) -> DomainResult<(Vec<CredentialRecord>, Registry)> {
        let registry = self.backend.load_registry().await?;
        let records = registry
            .list()
            .filter(|r| !expiring_only || r.status() != CredentialStatus::Active)
            .cloned()
            .collect();
        Ok((records, registry))
    }

    pub async fn update(&self, name: &str, changes: CredentialUpdate) -> DomainResult<CredentialRecord> {
        if changes.is_empty() {
            return Err(DomainError::ValidationFailed(
                "Nothing to update; pass --expiry-days, --notes or --rotation-type".to_string(),
            ));
        }

        let mut registry = self.backend.load_registry().await?;
        let record = registry
            .get_mut(name)
            .ok_or_else(|| DomainError::CredentialNotFound(name.to_string()))?;

        if let Some(days) = changes.expiry_days {
            if days <= 0 {
                return Err(DomainError::ValidationFailed(format!(
                    "Invalid expiry days: {days} (must be positive)"
                )));
            }
            let expires_at = Duration::try_days(days)
                .and_then(|ttl| Utc::now().checked_add_signed(ttl))
                .ok_or_else(|| {
                    DomainError::ValidationFailed(format!("Invalid expiry days: {days} (out of range)"))
                })?;
            record.expires_at = Some(expires_at);
        }
        if let Some(notes) = changes.notes {
            record.notes = notes;
        }
        if let Some(rotation_type) = changes.rotation_type {
            record.rotation_type = rotation_type;
        }

        let updated = record.clone();
        self.backend.save_registry(&mut registry).await?;

        info!(credential = %name, "credential updated");
        Ok(updated)
    }

    pub async fn remove(&self, name: &str) -> DomainResult<()> {
        let mut registry = self.backend.load_registry().await?;
        if !registry.remove(name) {
            return Err(DomainError::CredentialNotFound(name.to_string()));
        }
        self.backend.save_registry(&mut registry).await?;

        info!(credential = %name, "credential removed");
        Ok(())
    }

    /// Refresh the registry from the backend.
    pub async fn sync(&self) -> DomainResult<Registry> {
        Ok(self.backend.sync().await?)
    }
}
