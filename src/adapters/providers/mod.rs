//! Credential providers: one per issuing service.

pub mod akamai;
pub mod cloudflare;
pub mod edgegrid;
pub mod github;
pub mod linode;
pub mod manual;
pub mod postman;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Response};

use crate::domain::models::{param_keys, RotationParams};
use crate::domain::ports::{CredentialProvider, ProviderError};
use crate::services::ProviderRegistry;

pub use akamai::AkamaiEdgeGridProvider;
pub use cloudflare::CloudflareProvider;
pub use github::GitHubProvider;
pub use linode::LinodeProvider;
pub use manual::{OtherProvider, TerraformAccountProvider};
pub use postman::PostmanProvider;

/// Every built-in provider, keyed by service identifier.
pub fn build_default_providers(http: Client) -> ProviderRegistry {
    let providers: Vec<(&str, Arc<dyn CredentialProvider>)> = vec![
        ("github", Arc::new(GitHubProvider::new(http.clone()))),
        ("cloudflare", Arc::new(CloudflareProvider::new(http.clone()))),
        ("linode-cli", Arc::new(LinodeProvider::new(http.clone(), "CLI"))),
        ("linode-doppler", Arc::new(LinodeProvider::new(http.clone(), "Doppler"))),
        ("terraform-account", Arc::new(TerraformAccountProvider)),
        ("postman", Arc::new(PostmanProvider::new(http.clone()))),
        ("akamai", Arc::new(AkamaiEdgeGridProvider::new(http))),
        ("other", Arc::new(OtherProvider)),
    ];

    providers
        .into_iter()
        .map(|(service, provider)| (service.to_string(), provider))
        .collect()
}

/// Service identifiers accepted by `track`.
pub const SUPPORTED_SERVICES: &[&str] = &[
    "github",
    "cloudflare",
    "linode-cli",
    "linode-doppler",
    "terraform-account",
    "postman",
    "akamai",
    "other",
];

/// Turn a non-2xx response into [`ProviderError::Status`].
pub(crate) fn ensure_success(service: &str, response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ProviderError::Status {
            service: service.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Expiry `expiry_days` (or `default_days`) after `now`.
pub(crate) fn requested_expiry(
    params: &RotationParams,
    default_days: i64,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ProviderError> {
    let days = match params.get(param_keys::EXPIRY_DAYS) {
        Some(raw) => raw.parse::<i64>().map_err(|_| {
            ProviderError::MissingParameter(format!("expiry_days must be an integer, got {raw}"))
        })?,
        None => default_days,
    };
    Duration::try_days(days)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| ProviderError::MissingParameter(format!("expiry_days out of range: {days}")))
}
