//! Tracked credential domain model.
//!
//! A credential is a secret value issued by an external service. tokn never
//! stores the value itself; it tracks where the value lives (its locations),
//! which provider issues it, and when it expires.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamps;

/// Days remaining at or below which a credential counts as expiring soon.
pub const EXPIRING_SOON_DAYS: i64 = 7;

const SECONDS_PER_DAY: i64 = 86_400;

/// Kind-specific addressing for a location (section name, account id, project...).
pub type LocationMetadata = BTreeMap<String, String>;

/// Whether tokn may rotate a credential without a human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RotationType {
    /// Rotated by the provider's API
    #[default]
    Auto,
    /// Rotated by a human following the provider's instructions
    Manual,
}

impl RotationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

impl fmt::Display for RotationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expiry status derived from `expires_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    Active,
    ExpiringSoon,
    Expired,
}

impl CredentialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::ExpiringSoon => "expiring_soon",
            Self::Expired => "expired",
        }
    }

    /// Classify a whole-day count; `None` means the credential never expires.
    pub fn from_days_until_expiry(days: Option<i64>) -> Self {
        match days {
            None => Self::Active,
            Some(d) if d < 0 => Self::Expired,
            Some(d) if d <= EXPIRING_SOON_DAYS => Self::ExpiringSoon,
            Some(_) => Self::Active,
        }
    }
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A place where a credential's current value is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialLocation {
    /// Location kind, matched against the registered location handlers
    #[serde(rename = "type")]
    pub kind: String,
    /// Key or file path within that kind
    pub path: String,
    #[serde(default)]
    pub metadata: LocationMetadata,
}

impl CredentialLocation {
    pub fn new(kind: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            path: path.into(),
            metadata: LocationMetadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Identifier used in rotation reports and the rollback set: `kind:path`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind, self.path)
    }

    /// Parse the CLI form `kind:path[:key=value,key=value]`.
    ///
    /// Only the first two colons separate fields, so Windows paths and URLs in
    /// metadata values survive as long as the kind itself has no colon.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(spec: &str) -> Result<Self, String> {
        let mut parts = spec.splitn(3, ':');
        let kind = parts.next().unwrap_or_default().trim();
        let path = parts
            .next()
            .ok_or_else(|| format!("Invalid location format: {spec}. Use 'type:path'"))?
            .trim();

        if kind.is_empty() || path.is_empty() {
            return Err(format!("Invalid location format: {spec}. Use 'type:path'"));
        }

        let mut location = Self::new(kind, path);
        if let Some(pairs) = parts.next() {
            for pair in pairs.split(',') {
                if let Some((key, value)) = pair.split_once('=') {
                    location
                        .metadata
                        .insert(key.trim().to_string(), value.trim().to_string());
                }
            }
        }

        Ok(location)
    }
}

impl fmt::Display for CredentialLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.path)
    }
}

/// One tracked credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Unique name, primary key in the registry
    pub name: String,
    /// Provider identifier (github, cloudflare, linode-cli...)
    pub service: String,
    pub rotation_type: RotationType,
    /// Locations in priority order; the first readable one is the source of truth
    pub locations: Vec<CredentialLocation>,
    #[serde(default, with = "timestamps::optional")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamps::optional")]
    pub last_rotated: Option<DateTime<Utc>>,
    /// Preferred day of month for manual rotation reminders
    #[serde(default = "default_rotation_day")]
    pub rotation_day: u8,
    #[serde(default)]
    pub notes: String,
}

const fn default_rotation_day() -> u8 {
    1
}

impl CredentialRecord {
    pub fn new(
        name: impl Into<String>,
        service: impl Into<String>,
        rotation_type: RotationType,
        locations: Vec<CredentialLocation>,
    ) -> Self {
        Self {
            name: name.into(),
            service: service.into(),
            rotation_type,
            locations,
            expires_at: None,
            last_rotated: None,
            rotation_day: default_rotation_day(),
            notes: String::new(),
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Whole days until expiry, floored, so anything past the deadline is negative.
    pub fn days_until_expiry_at(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at
            .map(|expires| (expires - now).num_seconds().div_euclid(SECONDS_PER_DAY))
    }

    pub fn days_until_expiry(&self) -> Option<i64> {
        self.days_until_expiry_at(Utc::now())
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> CredentialStatus {
        CredentialStatus::from_days_until_expiry(self.days_until_expiry_at(now))
    }

    pub fn status(&self) -> CredentialStatus {
        self.status_at(Utc::now())
    }

    /// Check invariants enforced when a record enters the registry.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Credential name cannot be empty".to_string());
        }
        if self.service.trim().is_empty() {
            return Err("Service cannot be empty".to_string());
        }
        if self.locations.is_empty() {
            return Err("At least one location is required".to_string());
        }
        if !(1..=31).contains(&self.rotation_day) {
            return Err(format!(
                "Invalid rotation day: {} (must be 1-31)",
                self.rotation_day
            ));
        }
        Ok(())
    }
}
