use async_trait::async_trait;

use crate::domain::models::{RotationOutcome, RotationParams};

/// Issues new credential values for one external service.
///
/// `rotate` must never panic or return early with an error: transport and
/// vendor failures are reported as `RotationOutcome { success: false, .. }`,
/// which lets the orchestrator apply the same rollback logic to every
/// provider. Providers never touch local storage.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Whether `rotate` can issue a new value without a human
    fn supports_auto_rotation(&self) -> bool;

    /// Issue a new value, authenticating with `current_value`.
    ///
    /// Callers should check [`supports_auto_rotation`](Self::supports_auto_rotation)
    /// first; providers that decline return a failed outcome.
    async fn rotate(&self, current_value: &str, params: &RotationParams) -> RotationOutcome;

    /// Steps a human follows to rotate this credential
    fn manual_instructions(&self) -> String {
        format!(
            "Manual rotation required for {}. Please rotate via web UI.",
            self.name()
        )
    }
}
