//! Akamai API client credentials.
//!
//! Uses the Identity Management API on behalf of the API client described by
//! an `.edgerc` section: a new credential is created for the same client and
//! the old one is cut down to a short overlap window instead of being deleted,
//! so in-flight users of the old secret keep working for a few days.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, Method, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::edgegrid::EdgeGridCredentials;
use super::{ensure_success, requested_expiry};
use crate::adapters::locations::edgerc::{EdgercFile, DEFAULT_SECTION};
use crate::adapters::secure_file::{expand_path, read_optional};
use crate::domain::models::{param_keys, RotationOutcome, RotationParams};
use crate::domain::ports::{CredentialProvider, ProviderError};

const SERVICE: &str = "Akamai";
const CREDENTIALS_PATH: &str = "/identity-management/v3/api-clients/self/credentials";
const DEFAULT_EDGERC: &str = "~/.edgerc";
const OVERLAP_DAYS: i64 = 7;
const DEFAULT_EXPIRY_DAYS: i64 = 90;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Credential {
    credential_id: u64,
    #[serde(default)]
    client_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewCredential {
    client_secret: String,
    client_token: String,
}

pub struct AkamaiEdgeGridProvider {
    http: Client,
    /// Overrides `https://{host}` from the `.edgerc`
    base_url: Option<String>,
}

impl AkamaiEdgeGridProvider {
    pub fn new(http: Client) -> Self {
        Self { http, base_url: None }
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: Some(base_url.into()),
        }
    }

    async fn load_credentials(
        &self,
        current_secret: &str,
        params: &RotationParams,
    ) -> Result<EdgeGridCredentials, ProviderError> {
        let edgerc_path = params
            .get(param_keys::EDGERC_PATH)
            .map(String::as_str)
            .unwrap_or(DEFAULT_EDGERC);
        let section = params
            .get(param_keys::SECTION)
            .map(String::as_str)
            .unwrap_or(DEFAULT_SECTION);

        let contents = read_optional(&expand_path(edgerc_path))
            .await
            .map_err(|e| ProviderError::Rejected(format!("Could not read .edgerc {edgerc_path}: {e}")))?
            .ok_or_else(|| ProviderError::Rejected(format!(".edgerc file not found: {edgerc_path}")))?;
        let file = EdgercFile::parse(&contents)
            .map_err(|e| ProviderError::Rejected(format!("Invalid .edgerc {edgerc_path}: {e}")))?;

        let field = |key: &str| {
            file.get(section, key)
                .map(str::to_string)
                .ok_or_else(|| ProviderError::MissingParameter(format!("{key} in .edgerc section [{section}]")))
        };

        Ok(EdgeGridCredentials {
            host: field("host")?,
            client_token: field(param_keys::CLIENT_TOKEN)?,
            access_token: field("access_token")?,
            client_secret: current_secret.to_string(),
        })
    }

    fn url(&self, creds: &EdgeGridCredentials, path: &str) -> Result<Url, ProviderError> {
        let base = self
            .base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}", creds.host));
        Url::parse(&format!("{}{path}", base.trim_end_matches('/')))
            .map_err(|e| ProviderError::UnexpectedResponse(format!("invalid Akamai URL: {e}")))
    }

    async fn send(
        &self,
        creds: &EdgeGridCredentials,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, ProviderError> {
        let payload = match &body {
            Some(value) => serde_json::to_vec(value)
                .map_err(|e| ProviderError::UnexpectedResponse(e.to_string()))?,
            None => Vec::new(),
        };
        let authorization = creds.authorization(method.as_str(), &url, &payload);

        let mut request = self
            .http
            .request(method, url)
            .header("Accept", "application/json")
            .header("Authorization", authorization);
        if body.is_some() {
            request = request
                .header("Content-Type", "application/json")
                .body(payload);
        }

        ensure_success(SERVICE, request.send().await?)
    }

    async fn rotate_credential(
        &self,
        current: &str,
        params: &RotationParams,
    ) -> Result<RotationOutcome, ProviderError> {
        let creds = self.load_credentials(current, params).await?;
        let now = Utc::now();
        let expires_at = requested_expiry(params, DEFAULT_EXPIRY_DAYS, now)?;

        let list_url = self.url(&creds, CREDENTIALS_PATH)?;
        let existing: Vec<Credential> = self
            .send(&creds, Method::GET, list_url.clone(), None)
            .await?
            .json()
            .await?;
        let old = existing
            .into_iter()
            .find(|c| c.client_token.as_deref() == Some(creds.client_token.as_str()))
            .ok_or_else(|| {
                ProviderError::Rejected(format!(
                    "Could not find credential with clientToken: {}",
                    creds.client_token
                ))
            })?;

        let created: NewCredential = self
            .send(&creds, Method::POST, list_url, None)
            .await?
            .json()
            .await?;
        debug!("akamai credential created");

        let overlap_until = (now + Duration::days(OVERLAP_DAYS))
            .format("%Y-%m-%dT%H:%M:%S.000Z")
            .to_string();
        let update_url = self.url(&creds, &format!("{CREDENTIALS_PATH}/{}", old.credential_id))?;
        if let Err(err) = self
            .send(
                &creds,
                Method::PUT,
                update_url,
                Some(json!({ "expiresOn": overlap_until, "status": "ACTIVE" })),
            )
            .await
        {
            warn!(credential_id = old.credential_id, error = %err, "could not shorten old akamai credential expiry");
        }

        Ok(RotationOutcome::issued(created.client_secret)
            .with_secondary(param_keys::CLIENT_TOKEN, created.client_token)
            .with_rotated_at(now)
            .with_expiry(expires_at))
    }
}

#[async_trait]
impl CredentialProvider for AkamaiEdgeGridProvider {
    fn name(&self) -> &str {
        "Akamai EdgeGrid Credentials"
    }

    fn supports_auto_rotation(&self) -> bool {
        true
    }

    async fn rotate(&self, current_value: &str, params: &RotationParams) -> RotationOutcome {
        self.rotate_credential(current_value, params)
            .await
            .unwrap_or_else(|err| RotationOutcome::failed(err.to_string()))
    }
}
