//! Postman API keys. Regenerated in the web UI only.

use async_trait::async_trait;
use reqwest::Client;

use crate::adapters::locations::postman_env::POSTMAN_API_BASE;
use crate::domain::models::{RotationOutcome, RotationParams};
use crate::domain::ports::CredentialProvider;

pub struct PostmanProvider {
    http: Client,
    base_url: String,
}

impl PostmanProvider {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, POSTMAN_API_BASE)
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn validate_token(&self, token: &str) -> bool {
        self.http
            .get(format!("{}/me", self.base_url))
            .header("X-API-Key", token)
            .send()
            .await
            .is_ok_and(|response| response.status().is_success())
    }
}

#[async_trait]
impl CredentialProvider for PostmanProvider {
    fn name(&self) -> &str {
        "Postman API Key"
    }

    fn supports_auto_rotation(&self) -> bool {
        false
    }

    async fn rotate(&self, current_value: &str, _params: &RotationParams) -> RotationOutcome {
        if !self.validate_token(current_value).await {
            return RotationOutcome::failed("Current token is invalid or expired");
        }
        RotationOutcome::failed("Postman API keys require manual rotation. See instructions.")
    }

    fn manual_instructions(&self) -> String {
        "\
Manual rotation required for Postman API Key:

1. Go to: https://go.postman.co/settings/me/api-keys
2. Click \"...\" next to your key, then \"Regenerate API Key\"
3. Copy the new key
4. Update every tracked location (see: tokn info <name>)
5. Record the new expiry: tokn update <name> --expiry-days <days>
"
        .to_string()
    }
}
