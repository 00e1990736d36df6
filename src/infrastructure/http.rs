//! Shared outbound HTTP client.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::domain::models::HttpConfig;

/// Build the one `reqwest::Client` handed to every provider and API-backed
/// location handler.
pub fn build_http_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(4)
        .build()
        .context("Failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_with_defaults() {
        assert!(build_http_client(&HttpConfig::default()).is_ok());
    }
}
