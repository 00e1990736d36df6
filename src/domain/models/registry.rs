//! Credential registry: the tracking metadata persisted by a backend.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::credential::CredentialRecord;
use super::timestamps;

/// Mapping from credential name to its tracked record.
///
/// Holds metadata only, never credential values. Iteration order is by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default, rename = "tokens")]
    pub credentials: BTreeMap<String, CredentialRecord>,
    #[serde(default, with = "timestamps::optional")]
    pub last_sync: Option<DateTime<Utc>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record, keyed by its name.
    pub fn upsert(&mut self, record: CredentialRecord) {
        self.credentials.insert(record.name.clone(), record);
    }

    pub fn get(&self, name: &str) -> Option<&CredentialRecord> {
        self.credentials.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut CredentialRecord> {
        self.credentials.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.credentials.contains_key(name)
    }

    pub fn list(&self) -> impl Iterator<Item = &CredentialRecord> {
        self.credentials.values()
    }

    /// Remove a record; returns whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.credentials.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Stamp the sync time; backends call this right before persisting.
    pub fn touch(&mut self) {
        self.last_sync = Some(Utc::now());
    }
}
