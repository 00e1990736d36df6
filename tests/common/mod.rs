//! Common test utilities for integration tests
//!
//! In-memory doubles for the three ports (registry backend, provider,
//! location handler) so the orchestrator and services can be exercised
//! without touching vendor APIs or the filesystem.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use tokn::domain::models::{
    CredentialLocation, CredentialRecord, LocationMetadata, Registry, RotationOutcome,
    RotationParams, RotationType,
};
use tokn::domain::ports::{BackendError, CredentialProvider, LocationHandler, RegistryBackend};
use tokn::services::{LocationHandlerRegistry, ProviderRegistry, RotationOrchestrator};

/// Fixed timestamp providers report as `rotated_at`.
pub fn rotated_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 3, 2, 1).unwrap()
}

/// Setup test logging
///
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// ---------------------------------------------------------------------------
// Registry backend
// ---------------------------------------------------------------------------

/// Registry held in memory, with a save counter and failure switches.
#[derive(Default)]
pub struct InMemoryBackend {
    registry: Mutex<Registry>,
    saves: AtomicUsize,
    fail_load: AtomicBool,
    fail_save: AtomicBool,
}

impl InMemoryBackend {
    pub fn with_records(records: impl IntoIterator<Item = CredentialRecord>) -> Arc<Self> {
        let mut registry = Registry::new();
        for record in records {
            registry.upsert(record);
        }
        Arc::new(Self {
            registry: Mutex::new(registry),
            ..Default::default()
        })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Registry {
        self.registry.lock().unwrap().clone()
    }

    pub fn record(&self, name: &str) -> Option<CredentialRecord> {
        self.registry.lock().unwrap().get(name).cloned()
    }

    pub fn fail_loads(&self) {
        self.fail_load.store(true, Ordering::SeqCst);
    }

    pub fn fail_saves(&self) {
        self.fail_save.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl RegistryBackend for InMemoryBackend {
    fn backend_type(&self) -> &str {
        "memory"
    }

    async fn load_registry(&self) -> Result<Registry, BackendError> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("registry offline".to_string()));
        }
        Ok(self.registry.lock().unwrap().clone())
    }

    async fn save_registry(&self, registry: &mut Registry) -> Result<(), BackendError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("disk full".to_string()));
        }
        registry.touch();
        *self.registry.lock().unwrap() = registry.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// What a [`ScriptedProvider`] does when asked to rotate.
#[derive(Clone)]
pub enum Script {
    Issue(RotationOutcome),
    Fail(String),
    Panic(&'static str),
}

/// Provider whose rotate result is fixed up front; records every call.
pub struct ScriptedProvider {
    auto: bool,
    script: Script,
    calls: Mutex<Vec<(String, RotationParams)>>,
}

impl ScriptedProvider {
    pub fn issuing(new_value: &str) -> Arc<Self> {
        Self::scripted(Script::Issue(
            RotationOutcome::issued(new_value).with_rotated_at(rotated_at()),
        ))
    }

    pub fn scripted(script: Script) -> Arc<Self> {
        Arc::new(Self {
            auto: true,
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Provider that declines unattended rotation.
    pub fn manual_only() -> Arc<Self> {
        Arc::new(Self {
            auto: false,
            script: Script::Fail("manual only".to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Current value and params passed to the most recent rotate call.
    pub fn last_call(&self) -> Option<(String, RotationParams)> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CredentialProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn supports_auto_rotation(&self) -> bool {
        self.auto
    }

    async fn rotate(&self, current_value: &str, params: &RotationParams) -> RotationOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((current_value.to_string(), params.clone()));
        match &self.script {
            Script::Issue(outcome) => outcome.clone(),
            Script::Fail(reason) => RotationOutcome::failed(reason.clone()),
            Script::Panic(msg) => panic!("{}", msg),
        }
    }

    fn manual_instructions(&self) -> String {
        "Rotate it by hand in the Scripted console.".to_string()
    }
}

// ---------------------------------------------------------------------------
// Location handler
// ---------------------------------------------------------------------------

/// One observed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteCall {
    pub path: String,
    pub value: String,
    pub metadata: LocationMetadata,
}

/// Location handler over an in-memory map of path -> value.
pub struct RecordingHandler {
    kind: String,
    values: Mutex<HashMap<String, String>>,
    fail_writes: Mutex<Vec<String>>,
    fail_rollbacks: Mutex<Vec<String>>,
    no_backup: Mutex<Vec<String>>,
    writes: Mutex<Vec<WriteCall>>,
    rollbacks: Mutex<Vec<(String, String)>>,
    backups: AtomicUsize,
}

impl RecordingHandler {
    pub fn new(kind: &str) -> Arc<Self> {
        Arc::new(Self {
            kind: kind.to_string(),
            values: Mutex::new(HashMap::new()),
            fail_writes: Mutex::new(Vec::new()),
            fail_rollbacks: Mutex::new(Vec::new()),
            no_backup: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            rollbacks: Mutex::new(Vec::new()),
            backups: AtomicUsize::new(0),
        })
    }

    pub fn with_value(self: Arc<Self>, path: &str, value: &str) -> Arc<Self> {
        self.values
            .lock()
            .unwrap()
            .insert(path.to_string(), value.to_string());
        self
    }

    pub fn failing_write(self: Arc<Self>, path: &str) -> Arc<Self> {
        self.fail_writes.lock().unwrap().push(path.to_string());
        self
    }

    pub fn failing_rollback(self: Arc<Self>, path: &str) -> Arc<Self> {
        self.fail_rollbacks.lock().unwrap().push(path.to_string());
        self
    }

    /// `backup_value` returns `None` for this path.
    pub fn without_backup(self: Arc<Self>, path: &str) -> Arc<Self> {
        self.no_backup.lock().unwrap().push(path.to_string());
        self
    }

    pub fn value(&self, path: &str) -> Option<String> {
        self.values.lock().unwrap().get(path).cloned()
    }

    pub fn writes(&self) -> Vec<WriteCall> {
        self.writes.lock().unwrap().clone()
    }

    pub fn written_paths(&self) -> Vec<String> {
        self.writes().into_iter().map(|w| w.path).collect()
    }

    pub fn rollbacks(&self) -> Vec<(String, String)> {
        self.rollbacks.lock().unwrap().clone()
    }

    pub fn backups(&self) -> usize {
        self.backups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationHandler for RecordingHandler {
    fn kind(&self) -> &str {
        &self.kind
    }

    async fn read_value(&self, path: &str, _metadata: &LocationMetadata) -> Option<String> {
        self.value(path)
    }

    async fn write_value(&self, path: &str, value: &str, metadata: &LocationMetadata) -> bool {
        self.writes.lock().unwrap().push(WriteCall {
            path: path.to_string(),
            value: value.to_string(),
            metadata: metadata.clone(),
        });
        if self.fail_writes.lock().unwrap().iter().any(|p| p == path) {
            return false;
        }
        self.values
            .lock()
            .unwrap()
            .insert(path.to_string(), value.to_string());
        true
    }

    async fn backup_value(&self, path: &str, _metadata: &LocationMetadata) -> Option<String> {
        self.backups.fetch_add(1, Ordering::SeqCst);
        if self.no_backup.lock().unwrap().iter().any(|p| p == path) {
            return None;
        }
        self.value(path)
    }

    async fn rollback(&self, path: &str, snapshot: &str, _metadata: &LocationMetadata) -> bool {
        self.rollbacks
            .lock()
            .unwrap()
            .push((path.to_string(), snapshot.to_string()));
        if self.fail_rollbacks.lock().unwrap().iter().any(|p| p == path) {
            return false;
        }
        self.values
            .lock()
            .unwrap()
            .insert(path.to_string(), snapshot.to_string());
        true
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// AUTO record whose locations are all of kind `memory`.
pub fn auto_record(name: &str, service: &str, paths: &[&str]) -> CredentialRecord {
    CredentialRecord::new(
        name,
        service,
        RotationType::Auto,
        paths
            .iter()
            .map(|p| CredentialLocation::new("memory", *p))
            .collect(),
    )
}

pub fn manual_record(name: &str, service: &str, paths: &[&str]) -> CredentialRecord {
    let mut record = auto_record(name, service, paths);
    record.rotation_type = RotationType::Manual;
    record
}

/// Orchestrator over `backend` with the given providers and a single `memory` handler.
pub fn orchestrator(
    backend: Arc<InMemoryBackend>,
    providers: Vec<(&str, Arc<ScriptedProvider>)>,
    handler: Arc<RecordingHandler>,
) -> RotationOrchestrator {
    let providers: ProviderRegistry = providers
        .into_iter()
        .map(|(service, provider)| (service.to_string(), provider as Arc<dyn CredentialProvider>))
        .collect();
    let mut handlers = LocationHandlerRegistry::new();
    handlers.insert(handler.kind().to_string(), handler as Arc<dyn LocationHandler>);
    RotationOrchestrator::new(backend, providers, handlers)
}
