//! Cloudflare API tokens.
//!
//! The current token clones itself: its policies are read back, a new token is
//! created with the same policies, and only then is the old token deleted.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::ensure_success;
use crate::domain::models::{param_keys, RotationOutcome, RotationParams};
use crate::domain::ports::{CredentialProvider, ProviderError};

pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";
const SERVICE: &str = "Cloudflare";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct TokenId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TokenDetails {
    id: String,
    #[serde(default)]
    policies: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct CreatedToken {
    value: String,
}

pub struct CloudflareProvider {
    http: Client,
    base_url: String,
}

impl CloudflareProvider {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, CLOUDFLARE_API_BASE)
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    async fn token_details(&self, token: &str) -> Result<TokenDetails, ProviderError> {
        let response = self
            .http
            .get(format!("{}/user/tokens/verify", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        let verified: Envelope<TokenId> = ensure_success(SERVICE, response)?.json().await?;

        let response = self
            .http
            .get(format!("{}/user/tokens/{}", self.base_url, verified.result.id))
            .bearer_auth(token)
            .send()
            .await?;
        let details: Envelope<TokenDetails> = ensure_success(SERVICE, response)?.json().await?;
        Ok(details.result)
    }

    async fn rotate_token(&self, current: &str, params: &RotationParams) -> Result<String, ProviderError> {
        let details = self.token_details(current).await.map_err(|err| match err {
            ProviderError::Status { .. } | ProviderError::Http(_) => {
                ProviderError::UnexpectedResponse(format!(
                    "Could not retrieve current token details ({err})"
                ))
            }
            other => other,
        })?;

        if details.policies.is_empty() {
            return Err(ProviderError::Rejected(
                "Current token has no policies - cannot replicate".to_string(),
            ));
        }

        let name = params
            .get(param_keys::NAME)
            .cloned()
            .unwrap_or_else(|| format!("tokn-rotated-{}", Utc::now().format("%Y%m%d")));

        let response = self
            .http
            .post(format!("{}/user/tokens", self.base_url))
            .bearer_auth(current)
            .json(&json!({ "name": name, "policies": details.policies }))
            .send()
            .await?;
        let created: Envelope<CreatedToken> = ensure_success(SERVICE, response)?.json().await?;
        debug!(token_name = %name, "cloudflare token created");

        // The new token already exists; a failed delete leaves a stale token
        // behind but must not fail the rotation.
        match self
            .http
            .delete(format!("{}/user/tokens/{}", self.base_url, details.id))
            .bearer_auth(current)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => warn!(status = %response.status(), "could not delete old cloudflare token"),
            Err(err) => warn!(error = %err, "could not delete old cloudflare token"),
        }

        Ok(created.result.value)
    }
}

#[async_trait]
impl CredentialProvider for CloudflareProvider {
    fn name(&self) -> &str {
        "Cloudflare API Token"
    }

    fn supports_auto_rotation(&self) -> bool {
        true
    }

    async fn rotate(&self, current_value: &str, params: &RotationParams) -> RotationOutcome {
        match self.rotate_token(current_value, params).await {
            Ok(value) => RotationOutcome::issued(value),
            Err(err) => RotationOutcome::failed(err.to_string()),
        }
    }
}
