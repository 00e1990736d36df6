//! GitHub personal access tokens.
//!
//! PATs cannot be issued through the REST API without an OAuth or GitHub App,
//! so rotation is manual. `rotate` only confirms the current token still works.

use async_trait::async_trait;
use reqwest::Client;

use crate::domain::models::{RotationOutcome, RotationParams};
use crate::domain::ports::CredentialProvider;

pub const GITHUB_API_BASE: &str = "https://api.github.com";

pub struct GitHubProvider {
    http: Client,
    base_url: String,
}

impl GitHubProvider {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, GITHUB_API_BASE)
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// True when `GET /user` accepts the token.
    pub async fn validate_token(&self, token: &str) -> bool {
        self.http
            .get(format!("{}/user", self.base_url))
            .header("Authorization", format!("token {token}"))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .is_ok_and(|response| response.status().is_success())
    }
}

#[async_trait]
impl CredentialProvider for GitHubProvider {
    fn name(&self) -> &str {
        "GitHub PAT"
    }

    fn supports_auto_rotation(&self) -> bool {
        false
    }

    async fn rotate(&self, current_value: &str, _params: &RotationParams) -> RotationOutcome {
        if !self.validate_token(current_value).await {
            return RotationOutcome::failed("Current token is invalid or expired");
        }
        RotationOutcome::failed("GitHub PATs require manual rotation. See instructions.")
    }

    fn manual_instructions(&self) -> String {
        "\
Manual rotation required for GitHub PAT:

1. Go to: https://github.com/settings/tokens
2. Click \"Generate new token\" (fine-grained recommended)
3. Set expiration to 30 days
4. Select required permissions (repo, etc.)
5. Generate and copy the new token
6. Update every tracked location (see: tokn info <name>)
7. Record the new expiry: tokn update <name> --expiry-days 30
"
        .to_string()
    }
}
