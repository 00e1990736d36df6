use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::warn;

use super::{backup_file, load_file, read_file, restore_file, store_file};
use crate::domain::models::LocationMetadata;
use crate::domain::ports::LocationHandler;

const DEFAULT_HOSTNAME: &str = "app.terraform.io";

/// `~/.terraform.d/credentials.tfrc.json`: `credentials.{hostname}.token`.
///
/// The `hostname` metadata key selects the entry; other hosts are preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerraformCredentialsHandler;

fn hostname(metadata: &LocationMetadata) -> &str {
    metadata
        .get("hostname")
        .map(String::as_str)
        .unwrap_or(DEFAULT_HOSTNAME)
}

#[async_trait]
impl LocationHandler for TerraformCredentialsHandler {
    fn kind(&self) -> &str {
        "terraform-credentials"
    }

    async fn read_value(&self, path: &str, metadata: &LocationMetadata) -> Option<String> {
        let contents = read_file(path).await?;
        let data: Value = serde_json::from_str(&contents).ok()?;
        data.get("credentials")?
            .get(hostname(metadata))?
            .get("token")?
            .as_str()
            .map(str::to_string)
    }

    async fn write_value(&self, path: &str, value: &str, metadata: &LocationMetadata) -> bool {
        let mut data = match load_file(path).await {
            Ok(Some(contents)) => match serde_json::from_str::<Value>(&contents) {
                Ok(Value::Object(map)) => map,
                _ => {
                    warn!(path, "terraform credentials file is not a JSON object");
                    return false;
                }
            },
            Ok(None) => Map::new(),
            Err(_) => return false,
        };

        let credentials = data
            .entry("credentials")
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(credentials) = credentials.as_object_mut() else {
            return false;
        };
        credentials.insert(hostname(metadata).to_string(), json!({ "token": value }));

        match serde_json::to_string_pretty(&Value::Object(data)) {
            Ok(rendered) => store_file(path, &(rendered + "\n")).await,
            Err(_) => false,
        }
    }

    async fn backup_value(&self, path: &str, _metadata: &LocationMetadata) -> Option<String> {
        backup_file(path).await
    }

    async fn rollback(&self, path: &str, snapshot: &str, _metadata: &LocationMetadata) -> bool {
        restore_file(path, snapshot).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_keeps_other_hosts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.tfrc.json");
        std::fs::write(
            &path,
            r#"{"credentials":{"tfe.example.com":{"token":"other"},"app.terraform.io":{"token":"old"}}}"#,
        )
        .unwrap();
        let path = path.to_str().unwrap();
        let handler = TerraformCredentialsHandler;
        let metadata = LocationMetadata::new();

        assert_eq!(handler.read_value(path, &metadata).await.as_deref(), Some("old"));
        assert!(handler.write_value(path, "new", &metadata).await);

        let data: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(data["credentials"]["app.terraform.io"]["token"], "new");
        assert_eq!(data["credentials"]["tfe.example.com"]["token"], "other");
    }

    #[tokio::test]
    async fn test_custom_hostname_in_new_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("terraform.d/credentials.tfrc.json");
        let path = path.to_str().unwrap();
        let handler = TerraformCredentialsHandler;
        let mut metadata = LocationMetadata::new();
        metadata.insert("hostname".to_string(), "tfe.example.com".to_string());

        assert!(handler.write_value(path, "tok", &metadata).await);
        assert_eq!(handler.read_value(path, &metadata).await.as_deref(), Some("tok"));
        assert!(handler.read_value(path, &LocationMetadata::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_unreadable_file_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.tfrc.json");
        let original: &[u8] = b"{\"credentials\":{\"tfe.example.com\":{\"token\":\"\xff\"}}}";
        std::fs::write(&path, original).unwrap();
        let path = path.to_str().unwrap();
        let handler = TerraformCredentialsHandler;
        let metadata = LocationMetadata::new();

        assert!(handler.backup_value(path, &metadata).await.is_none());
        assert!(!handler.write_value(path, "tok", &metadata).await);
        assert_eq!(std::fs::read(path).unwrap(), original);
    }

    #[tokio::test]
    async fn test_malformed_file_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.tfrc.json");
        std::fs::write(&path, "not json").unwrap();
        let path = path.to_str().unwrap();
        let handler = TerraformCredentialsHandler;

        assert!(!handler.write_value(path, "tok", &LocationMetadata::new()).await);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "not json");
    }
}
