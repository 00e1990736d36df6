use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::warn;

use crate::domain::models::LocationMetadata;
use crate::domain::ports::LocationHandler;

pub const POSTMAN_API_BASE: &str = "https://api.getpostman.com";
pub const API_KEY_ENV: &str = "POSTMAN_API_KEY";

/// A variable inside a Postman environment, edited through the Postman API.
///
/// `path` is the variable key; the `environment_id` metadata selects the
/// environment. Authenticates with `POSTMAN_API_KEY`.
pub struct PostmanEnvironmentHandler {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PostmanEnvironmentHandler {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: POSTMAN_API_BASE.to_string(),
            api_key: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a fixed API key instead of reading the environment.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
    }

    fn environment_url(&self, environment_id: &str) -> String {
        format!("{}/environments/{environment_id}", self.base_url)
    }

    async fn fetch_environment(&self, api_key: &str, environment_id: &str) -> Option<Value> {
        let response = match self
            .http
            .get(self.environment_url(environment_id))
            .header("X-API-Key", api_key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(environment_id, error = %err, "postman request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(environment_id, status = %response.status(), "could not fetch postman environment");
            return None;
        }
        response.json::<Value>().await.ok()
    }
}

#[async_trait]
impl LocationHandler for PostmanEnvironmentHandler {
    fn kind(&self) -> &str {
        "postman-env"
    }

    async fn read_value(&self, path: &str, metadata: &LocationMetadata) -> Option<String> {
        let environment_id = metadata.get("environment_id")?;
        let api_key = self.api_key()?;
        let data = self.fetch_environment(&api_key, environment_id).await?;

        data["environment"]["values"]
            .as_array()?
            .iter()
            .find(|var| var["key"] == path)
            .and_then(|var| var["value"].as_str())
            .map(str::to_string)
    }

    async fn write_value(&self, path: &str, value: &str, metadata: &LocationMetadata) -> bool {
        let (Some(environment_id), Some(api_key)) = (metadata.get("environment_id"), self.api_key()) else {
            return false;
        };
        let Some(data) = self.fetch_environment(&api_key, environment_id).await else {
            return false;
        };

        let name = data["environment"]["name"].as_str().unwrap_or_default().to_string();
        let mut values = data["environment"]["values"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        match values.iter_mut().find(|var| var["key"] == path) {
            Some(var) => var["value"] = Value::String(value.to_string()),
            None => values.push(json!({ "key": path, "value": value, "enabled": true })),
        }

        let body = json!({ "environment": { "name": name, "values": values } });
        match self
            .http
            .put(self.environment_url(environment_id))
            .header("X-API-Key", &api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(environment_id, status = %response.status(), "postman environment update rejected");
                false
            }
            Err(err) => {
                warn!(environment_id, error = %err, "postman request failed");
                false
            }
        }
    }

    async fn backup_value(&self, path: &str, metadata: &LocationMetadata) -> Option<String> {
        self.read_value(path, metadata).await
    }
}
