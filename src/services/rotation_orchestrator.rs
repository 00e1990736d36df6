//! Rotation orchestrator.
//!
//! Coordinates provider-side issuance of a new credential value with its
//! propagation to every location the credential is stored in. A rotation
//! either lands everywhere or every touched location is restored from the
//! snapshot taken before the provider was called.
//!
//! One rotation runs these steps strictly in sequence:
//!
//! 1. resolve the provider and check it can rotate unattended
//! 2. read the current value from the first readable location
//! 3. snapshot every location
//! 4. ask the provider for a new value
//! 5. write the new value to every location, in order
//! 6. record `last_rotated`/`expires_at` in the registry and persist it
//!
//! # Concurrency
//!
//! The orchestrator assumes a single active invocation per credential. Nothing
//! prevents two processes from rotating the same credential at once, and the
//! registry is reloaded and saved without versioning, so concurrent writers
//! can silently overwrite each other's metadata (last writer wins).

use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    BatchRotationReport, CredentialLocation, CredentialRecord, FailedEntry, LocationMetadata,
    ManualEntry, RotatedEntry, RotationOutcome, RotationReport, RotationType,
    AUTO_ROTATION_UNSUPPORTED,
};
use crate::domain::ports::{BackendError, CredentialProvider, LocationHandler, RegistryBackend};
use crate::infrastructure::logging::SecretScrubber;
use crate::services::rotation_params::derive_rotation_params;

/// Service identifier → provider.
pub type ProviderRegistry = HashMap<String, Arc<dyn CredentialProvider>>;

/// Location kind → handler.
pub type LocationHandlerRegistry = HashMap<String, Arc<dyn LocationHandler>>;

const ROTATED_MESSAGE: &str = "Credential rotated successfully";

/// Why a single rotation stopped. Rendered into the report message.
#[derive(Debug, Error)]
enum RotationError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Unknown location type: {0}")]
    UnknownLocationKind(String),

    #[error("{0}")]
    ManualRotation(String),

    #[error("{}", AUTO_ROTATION_UNSUPPORTED)]
    AutoRotationUnsupported,

    #[error("Could not read current value")]
    CurrentValueUnavailable,

    #[error("Rotation failed: {0}")]
    ProviderFailed(String),

    #[error("Rotation succeeded but no value returned")]
    NoValueIssued,

    #[error("Failed to update location: {0}")]
    LocationUpdateFailed(String),

    #[error("Unexpected error: {0}")]
    Persist(#[from] BackendError),
}

/// Snapshots taken before the provider is called.
#[derive(Debug, Default)]
struct RollbackSet {
    /// `(location, snapshot)` in location order, one per `kind:path`
    snapshots: Vec<(CredentialLocation, String)>,
    /// `kind:path` keys a write was attempted on
    touched: HashSet<String>,
}

impl RollbackSet {
    fn record(&mut self, location: &CredentialLocation, snapshot: String) {
        let key = location.key();
        if !self.snapshots.iter().any(|(l, _)| l.key() == key) {
            self.snapshots.push((location.clone(), snapshot));
        }
    }

    fn mark_touched(&mut self, location: &CredentialLocation) {
        self.touched.insert(location.key());
    }

    /// Snapshots of locations that may have been modified.
    fn pending(&self) -> impl Iterator<Item = &(CredentialLocation, String)> {
        self.snapshots
            .iter()
            .filter(|(location, _)| self.touched.contains(&location.key()))
    }
}

/// Rotates tracked credentials and propagates the new values.
pub struct RotationOrchestrator {
    backend: Arc<dyn RegistryBackend>,
    providers: ProviderRegistry,
    handlers: LocationHandlerRegistry,
    scrubber: SecretScrubber,
}

impl RotationOrchestrator {
    pub fn new(
        backend: Arc<dyn RegistryBackend>,
        providers: ProviderRegistry,
        handlers: LocationHandlerRegistry,
    ) -> Self {
        Self {
            backend,
            providers,
            handlers,
            scrubber: SecretScrubber::new(),
        }
    }

    pub fn provider(&self, service: &str) -> Option<&Arc<dyn CredentialProvider>> {
        self.providers.get(service)
    }

    pub fn backend(&self) -> &Arc<dyn RegistryBackend> {
        &self.backend
    }

    /// Rotate one credential and propagate the new value to all its locations.
    ///
    /// Never panics and never returns an error: every path ends in a
    /// [`RotationReport`]. A MANUAL credential yields a failed report whose
    /// message is the provider's manual instructions.
    #[instrument(skip_all, fields(credential = %record.name, service = %record.service))]
    pub async fn rotate_credential(&self, record: &CredentialRecord) -> RotationReport {
        let provider = match self.resolve(record) {
            Ok(provider) => provider,
            Err(err) => {
                debug!(reason = %err, "rotation not attempted");
                return RotationReport::failed(err.to_string());
            }
        };

        info!("starting rotation");
        let mut rollback = RollbackSet::default();
        let result = AssertUnwindSafe(self.execute(record, provider.as_ref(), &mut rollback))
            .catch_unwind()
            .await;

        let message = match result {
            Ok(Ok(locations)) => {
                info!(locations = ?locations, "rotation complete");
                return RotationReport::succeeded(ROTATED_MESSAGE, locations);
            }
            Ok(Err(err)) => err.to_string(),
            Err(panic) => {
                error!("rotation aborted by an unexpected panic");
                format!("Unexpected error: {}", panic_message(panic.as_ref()))
            }
        };

        let failed_restores = self.restore(&rollback).await;
        warn!(reason = %message, "rotation failed");

        if failed_restores.is_empty() {
            RotationReport::failed(message)
        } else {
            RotationReport::failed(format!(
                "{message}; rollback failed for: {}",
                failed_restores.join(", ")
            ))
        }
    }

    /// Report what [`rotate_credential`](Self::rotate_credential) would update.
    ///
    /// Runs provider resolution and the current-value read only: no snapshot,
    /// no provider call, no writes, no registry save.
    #[instrument(skip_all, fields(credential = %record.name, service = %record.service))]
    pub async fn plan_rotation(&self, record: &CredentialRecord) -> RotationReport {
        let provider = match self.resolve(record) {
            Ok(provider) => provider,
            Err(err) => return RotationReport::failed(err.to_string()),
        };

        if self.read_current_value(record).await.is_none() {
            return RotationReport::failed(RotationError::CurrentValueUnavailable.to_string());
        }

        RotationReport::succeeded(
            format!("Would rotate via {}", provider.name()),
            record.locations.iter().map(CredentialLocation::key).collect(),
        )
    }

    /// Rotate every credential in the registry.
    ///
    /// With `auto_only`, MANUAL credentials go straight to the manual bucket.
    /// A failure on one credential never stops or undoes the others. Only a
    /// failure to load the registry aborts the batch.
    #[instrument(skip(self))]
    pub async fn rotate_all(&self, auto_only: bool) -> DomainResult<BatchRotationReport> {
        self.run_batch(auto_only, false).await
    }

    /// Dry-run counterpart of [`rotate_all`](Self::rotate_all).
    #[instrument(skip(self))]
    pub async fn plan_all(&self, auto_only: bool) -> DomainResult<BatchRotationReport> {
        self.run_batch(auto_only, true).await
    }

    async fn run_batch(&self, auto_only: bool, dry_run: bool) -> DomainResult<BatchRotationReport> {
        let registry = self.backend.load_registry().await?;
        let mut report = BatchRotationReport::default();

        for record in registry.list() {
            if auto_only && record.rotation_type == RotationType::Manual {
                match self.providers.get(&record.service) {
                    Some(provider) => report.manual.push(ManualEntry {
                        name: record.name.clone(),
                        instructions: provider.manual_instructions(),
                    }),
                    None => report.failed.push(FailedEntry {
                        name: record.name.clone(),
                        error: RotationError::UnknownProvider(record.service.clone()).to_string(),
                    }),
                }
                continue;
            }

            let outcome = if dry_run {
                self.plan_rotation(record).await
            } else {
                self.rotate_credential(record).await
            };

            if outcome.success {
                report.success.push(RotatedEntry {
                    name: record.name.clone(),
                    message: outcome.message,
                    locations: outcome.locations,
                });
            } else if outcome.is_auto_rotation_unsupported() {
                report.manual.push(ManualEntry {
                    name: record.name.clone(),
                    instructions: outcome.message,
                });
            } else {
                report.failed.push(FailedEntry {
                    name: record.name.clone(),
                    error: outcome.message,
                });
            }
        }

        info!(
            rotated = report.success.len(),
            failed = report.failed.len(),
            manual = report.manual.len(),
            dry_run,
            "batch rotation finished"
        );
        Ok(report)
    }

    /// Configuration checks that run before any side effect.
    fn resolve(&self, record: &CredentialRecord) -> Result<Arc<dyn CredentialProvider>, RotationError> {
        let provider = self
            .providers
            .get(&record.service)
            .cloned()
            .ok_or_else(|| RotationError::UnknownProvider(record.service.clone()))?;

        if record.rotation_type == RotationType::Manual {
            return Err(RotationError::ManualRotation(provider.manual_instructions()));
        }

        if !provider.supports_auto_rotation() {
            return Err(RotationError::AutoRotationUnsupported);
        }

        if let Some(location) = record
            .locations
            .iter()
            .find(|l| !self.handlers.contains_key(&l.kind))
        {
            return Err(RotationError::UnknownLocationKind(location.kind.clone()));
        }

        Ok(provider)
    }

    async fn execute(
        &self,
        record: &CredentialRecord,
        provider: &dyn CredentialProvider,
        rollback: &mut RollbackSet,
    ) -> Result<Vec<String>, RotationError> {
        let current_value = self
            .read_current_value(record)
            .await
            .ok_or(RotationError::CurrentValueUnavailable)?;

        for location in &record.locations {
            if let Some(snapshot) = self.backup_location(location).await {
                rollback.record(location, snapshot);
            }
        }
        debug!(snapshots = rollback.snapshots.len(), "locations backed up");

        let params = derive_rotation_params(record);
        let outcome = provider.rotate(&current_value, &params).await;

        if !outcome.success {
            let reason = outcome.error.as_deref().unwrap_or("unknown error");
            return Err(RotationError::ProviderFailed(
                self.scrubber.scrub_known(reason, &current_value),
            ));
        }

        let new_value = outcome
            .new_value
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or(RotationError::NoValueIssued)?;

        let mut updated = Vec::with_capacity(record.locations.len());
        for location in &record.locations {
            rollback.mark_touched(location);
            let metadata = write_metadata(location, &outcome);
            if !self.write_location(location, new_value, &metadata).await {
                return Err(RotationError::LocationUpdateFailed(location.key()));
            }
            debug!(location = %location, "location updated");
            updated.push(location.key());
        }

        self.commit(record, &outcome).await?;
        Ok(updated)
    }

    /// First value found, walking locations in priority order.
    async fn read_current_value(&self, record: &CredentialRecord) -> Option<String> {
        for location in &record.locations {
            let Some(handler) = self.handlers.get(&location.kind) else {
                continue;
            };
            if let Some(value) = handler.read_value(&location.path, &location.metadata).await {
                if !value.is_empty() {
                    debug!(location = %location, "current value read");
                    return Some(value);
                }
            }
        }
        None
    }

    async fn backup_location(&self, location: &CredentialLocation) -> Option<String> {
        let handler = self.handlers.get(&location.kind)?;
        handler.backup_value(&location.path, &location.metadata).await
    }

    async fn write_location(
        &self,
        location: &CredentialLocation,
        value: &str,
        metadata: &LocationMetadata,
    ) -> bool {
        match self.handlers.get(&location.kind) {
            Some(handler) => handler.write_value(&location.path, value, metadata).await,
            None => false,
        }
    }

    /// Restore every touched location that has a snapshot.
    ///
    /// Returns the `kind:path` keys whose restore failed.
    async fn restore(&self, rollback: &RollbackSet) -> Vec<String> {
        let mut failed = Vec::new();

        for (location, snapshot) in rollback.pending() {
            let restored = match self.handlers.get(&location.kind) {
                Some(handler) => {
                    handler
                        .rollback(&location.path, snapshot, &location.metadata)
                        .await
                }
                None => false,
            };

            if restored {
                info!(location = %location, "location restored from snapshot");
            } else {
                error!(location = %location, "failed to restore location from snapshot");
                failed.push(location.key());
            }
        }

        failed
    }

    async fn commit(
        &self,
        record: &CredentialRecord,
        outcome: &RotationOutcome,
    ) -> Result<(), RotationError> {
        let mut updated = record.clone();
        updated.last_rotated = Some(outcome.rotated_at);
        if let Some(expires_at) = outcome.expires_at {
            updated.expires_at = Some(expires_at);
        }

        let mut registry = self.backend.load_registry().await?;
        registry.upsert(updated);
        self.backend.save_registry(&mut registry).await?;
        Ok(())
    }
}

/// Location metadata plus the provider's secondary value, if any.
fn write_metadata(location: &CredentialLocation, outcome: &RotationOutcome) -> LocationMetadata {
    let mut metadata = location.metadata.clone();
    if let Some(secondary) = &outcome.secondary {
        metadata.insert(secondary.field.clone(), secondary.value.clone());
    }
    metadata
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "internal error".to_string()
    }
}
