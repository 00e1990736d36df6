//! Rotation outcomes and reports.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Named parameters handed to a provider's `rotate` (label, scopes, account id...).
pub type RotationParams = BTreeMap<String, String>;

/// Parameter and metadata keys shared by the parameter table, providers, and handlers.
pub mod param_keys {
    pub const SCOPES: &str = "scopes";
    pub const NOTE: &str = "note";
    pub const NAME: &str = "name";
    pub const LABEL: &str = "label";
    pub const ACCOUNT_ID: &str = "account_id";
    pub const EXPIRY_DAYS: &str = "expiry_days";
    pub const EDGERC_PATH: &str = "edgerc_path";
    pub const SECTION: &str = "section";
    pub const CLIENT_TOKEN: &str = "client_token";
}

/// Message for a provider that declines unattended rotation.
///
/// Batch rotation matches on this text to move a credential into the manual
/// bucket, so every producer must use this constant.
pub const AUTO_ROTATION_UNSUPPORTED: &str = "Provider does not support auto-rotation";

/// Substring of [`AUTO_ROTATION_UNSUPPORTED`] used for batch classification.
pub const AUTO_ROTATION_UNSUPPORTED_MARKER: &str = "does not support auto-rotation";

/// A companion value issued together with the primary secret.
///
/// Both halves must land at every location in the same write; the field name
/// is passed to location handlers as an extra metadata key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryValue {
    pub field: String,
    pub value: String,
}

/// Result of one provider rotation attempt.
#[derive(Debug, Clone)]
pub struct RotationOutcome {
    pub success: bool,
    pub new_value: Option<String>,
    pub secondary: Option<SecondaryValue>,
    pub error: Option<String>,
    pub rotated_at: DateTime<Utc>,
    /// New expiry reported by the provider, if it knows one
    pub expires_at: Option<DateTime<Utc>>,
}

impl RotationOutcome {
    /// A successful issuance of `new_value`.
    pub fn issued(new_value: impl Into<String>) -> Self {
        Self {
            success: true,
            new_value: Some(new_value.into()),
            secondary: None,
            error: None,
            rotated_at: Utc::now(),
            expires_at: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            new_value: None,
            secondary: None,
            error: Some(error.into()),
            rotated_at: Utc::now(),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn with_secondary(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.secondary = Some(SecondaryValue {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_rotated_at(mut self, rotated_at: DateTime<Utc>) -> Self {
        self.rotated_at = rotated_at;
        self
    }
}

/// Terminal result of rotating one credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationReport {
    pub success: bool,
    pub message: String,
    /// `kind:path` identifiers updated, in propagation order
    pub locations: Vec<String>,
}

impl RotationReport {
    pub fn succeeded(message: impl Into<String>, locations: Vec<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            locations,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            locations: Vec::new(),
        }
    }

    /// The provider declined unattended rotation; an expected, non-erroneous state.
    pub fn is_auto_rotation_unsupported(&self) -> bool {
        !self.success && self.message.contains(AUTO_ROTATION_UNSUPPORTED_MARKER)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotatedEntry {
    pub name: String,
    pub message: String,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedEntry {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualEntry {
    pub name: String,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: String,
}

/// Buckets produced by batch rotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchRotationReport {
    pub success: Vec<RotatedEntry>,
    pub failed: Vec<FailedEntry>,
    pub manual: Vec<ManualEntry>,
    /// Reserved; no path populates it yet
    pub skipped: Vec<SkippedEntry>,
}

impl BatchRotationReport {
    pub fn total(&self) -> usize {
        self.success.len() + self.failed.len() + self.manual.len() + self.skipped.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_marker_is_part_of_message() {
        assert!(AUTO_ROTATION_UNSUPPORTED.contains(AUTO_ROTATION_UNSUPPORTED_MARKER));
        assert!(RotationReport::failed(AUTO_ROTATION_UNSUPPORTED).is_auto_rotation_unsupported());
        assert!(!RotationReport::failed("Could not read current value").is_auto_rotation_unsupported());
    }

    #[test]
    fn test_failed_outcome_always_has_timestamp() {
        let before = Utc::now();
        let outcome = RotationOutcome::failed("boom");
        assert!(!outcome.success);
        assert!(outcome.new_value.is_none());
        assert!(outcome.rotated_at >= before);
    }

    #[test]
    fn test_secondary_value_builder() {
        let outcome = RotationOutcome::issued("secret").with_secondary("client_token", "akab-new");
        let secondary = outcome.secondary.unwrap();
        assert_eq!(secondary.field, "client_token");
        assert_eq!(secondary.value, "akab-new");
    }
}
