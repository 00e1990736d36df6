//! Linode personal access tokens.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::{ensure_success, requested_expiry};
use crate::domain::models::{param_keys, RotationOutcome, RotationParams};
use crate::domain::ports::{CredentialProvider, ProviderError};

pub const LINODE_API_BASE: &str = "https://api.linode.com/v4";
const SERVICE: &str = "Linode";
const DEFAULT_EXPIRY_DAYS: i64 = 30;
/// Linode lists tokens by their first 16 characters only.
const TOKEN_PREFIX_LEN: usize = 16;

#[derive(Debug, Deserialize)]
struct CreatedToken {
    token: String,
}

#[derive(Debug, Deserialize)]
struct TokenPage {
    data: Vec<ListedToken>,
}

#[derive(Debug, Deserialize)]
struct ListedToken {
    id: u64,
    #[serde(default)]
    token: Option<String>,
}

/// Creates a replacement token, then revokes the current one.
pub struct LinodeProvider {
    http: Client,
    base_url: String,
    display_name: String,
    token_type: String,
}

impl LinodeProvider {
    /// `token_type` distinguishes the CLI token from the one kept in Doppler.
    pub fn new(http: Client, token_type: &str) -> Self {
        Self::with_base_url(http, token_type, LINODE_API_BASE)
    }

    pub fn with_base_url(http: Client, token_type: &str, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            display_name: format!("Linode {token_type} Token"),
            token_type: token_type.to_lowercase(),
        }
    }

    async fn current_token_id(&self, token: &str) -> Result<Option<u64>, ProviderError> {
        let response = self
            .http
            .get(format!("{}/profile/tokens", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        let page: TokenPage = ensure_success(SERVICE, response)?.json().await?;

        let prefix: String = token.chars().take(TOKEN_PREFIX_LEN).collect();
        Ok(page
            .data
            .into_iter()
            .find(|t| t.token.as_deref() == Some(prefix.as_str()))
            .map(|t| t.id))
    }

    async fn revoke(&self, token: &str, id: u64) {
        match self
            .http
            .delete(format!("{}/profile/tokens/{id}", self.base_url))
            .bearer_auth(token)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => debug!(token_id = id, "old linode token revoked"),
            Ok(response) => warn!(token_id = id, status = %response.status(), "could not revoke old linode token"),
            Err(err) => warn!(token_id = id, error = %err, "could not revoke old linode token"),
        }
    }

    async fn rotate_token(
        &self,
        current: &str,
        params: &RotationParams,
    ) -> Result<RotationOutcome, ProviderError> {
        let now = Utc::now();
        let label = params.get(param_keys::LABEL).cloned().unwrap_or_else(|| {
            format!("tokn-{}-{}", self.token_type, now.format("%Y%m%d"))
        });
        let scopes = params
            .get(param_keys::SCOPES)
            .map(String::as_str)
            .unwrap_or("*");
        let expires_at = requested_expiry(params, DEFAULT_EXPIRY_DAYS, now)?;

        let response = self
            .http
            .post(format!("{}/profile/tokens", self.base_url))
            .bearer_auth(current)
            .json(&json!({
                "label": label,
                "scopes": scopes,
                "expiry": expires_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            }))
            .send()
            .await?;
        let created: CreatedToken = ensure_success(SERVICE, response)?.json().await?;
        debug!(label = %label, "linode token created");

        match self.current_token_id(current).await {
            Ok(Some(id)) => self.revoke(current, id).await,
            Ok(None) => warn!("old linode token not found in token list; not revoked"),
            Err(err) => warn!(error = %err, "could not list linode tokens; old token not revoked"),
        }

        Ok(RotationOutcome::issued(created.token)
            .with_rotated_at(now)
            .with_expiry(expires_at))
    }
}

#[async_trait]
impl CredentialProvider for LinodeProvider {
    fn name(&self) -> &str {
        &self.display_name
    }

    fn supports_auto_rotation(&self) -> bool {
        true
    }

    async fn rotate(&self, current_value: &str, params: &RotationParams) -> RotationOutcome {
        self.rotate_token(current_value, params)
            .await
            .unwrap_or_else(|err| RotationOutcome::failed(err.to_string()))
    }
}
