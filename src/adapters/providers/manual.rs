//! Providers with no API at all: tracking and reminders only.

use async_trait::async_trait;

use crate::domain::models::{RotationOutcome, RotationParams};
use crate::domain::ports::CredentialProvider;

/// HCP Terraform user tokens, reissued by `terraform login`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerraformAccountProvider;

#[async_trait]
impl CredentialProvider for TerraformAccountProvider {
    fn name(&self) -> &str {
        "HCP Terraform Account Token"
    }

    fn supports_auto_rotation(&self) -> bool {
        false
    }

    async fn rotate(&self, _current_value: &str, _params: &RotationParams) -> RotationOutcome {
        RotationOutcome::failed("Manual rotation required via 'terraform login'")
    }

    fn manual_instructions(&self) -> String {
        "\
Manual rotation required for HCP Terraform Account Token:

1. Run: terraform login
2. Follow the OAuth flow in the browser
3. The token is saved to ~/.terraform.d/credentials.tfrc.json
"
        .to_string()
    }
}

/// Anything tokn has no integration for. Notes on the record carry the
/// service-specific steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct OtherProvider;

#[async_trait]
impl CredentialProvider for OtherProvider {
    fn name(&self) -> &str {
        "Other/Custom Service"
    }

    fn supports_auto_rotation(&self) -> bool {
        false
    }

    async fn rotate(&self, _current_value: &str, _params: &RotationParams) -> RotationOutcome {
        RotationOutcome::failed("Manual rotation required for custom services")
    }

    fn manual_instructions(&self) -> String {
        "\
Manual rotation required for this custom service.

Check the credential's notes for service-specific steps:
  tokn info <name>

1. Rotate the credential in the service's web UI or API
2. Update every tracked location
3. Record the new expiry: tokn update <name> --expiry-days <days>
"
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_providers_never_issue() {
        for provider in [
            &TerraformAccountProvider as &dyn CredentialProvider,
            &OtherProvider,
        ] {
            assert!(!provider.supports_auto_rotation());
            let outcome = provider.rotate("x", &RotationParams::new()).await;
            assert!(!outcome.success);
            assert!(outcome.new_value.is_none());
        }
    }
}
