use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::adapters::doppler_cli::{secrets_get_args, secrets_set_args, DopplerCli};
use crate::domain::models::LocationMetadata;
use crate::domain::ports::LocationHandler;

/// A Doppler secret. `path` is the secret name; `project` and `config`
/// metadata select where it lives (CLI defaults otherwise).
pub struct DopplerLocationHandler {
    cli: Arc<dyn DopplerCli>,
}

impl DopplerLocationHandler {
    pub fn new(cli: Arc<dyn DopplerCli>) -> Self {
        Self { cli }
    }
}

fn scope(metadata: &LocationMetadata) -> (Option<&str>, Option<&str>) {
    (
        metadata.get("project").map(String::as_str),
        metadata.get("config").map(String::as_str),
    )
}

#[async_trait]
impl LocationHandler for DopplerLocationHandler {
    fn kind(&self) -> &str {
        "doppler"
    }

    async fn read_value(&self, path: &str, metadata: &LocationMetadata) -> Option<String> {
        let (project, config) = scope(metadata);
        match self.cli.run(&secrets_get_args(path, project, config), None).await {
            Ok(value) if !value.is_empty() => Some(value),
            Ok(_) => None,
            Err(err) => {
                warn!(secret = path, error = %err, "could not read doppler secret");
                None
            }
        }
    }

    async fn write_value(&self, path: &str, value: &str, metadata: &LocationMetadata) -> bool {
        let (project, config) = scope(metadata);
        match self
            .cli
            .run(&secrets_set_args(path, project, config), Some(value))
            .await
        {
            Ok(_) => true,
            Err(err) => {
                warn!(secret = path, error = %err, "could not write doppler secret");
                false
            }
        }
    }

    async fn backup_value(&self, path: &str, metadata: &LocationMetadata) -> Option<String> {
        self.read_value(path, metadata).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::BackendError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeDoppler {
        secrets: Mutex<std::collections::HashMap<String, String>>,
        fail_writes: bool,
    }

    #[async_trait]
    impl DopplerCli for FakeDoppler {
        async fn run(&self, args: &[String], stdin: Option<&str>) -> Result<String, BackendError> {
            let name = args[2].clone();
            match args[1].as_str() {
                "get" => self.secrets.lock().unwrap().get(&name).cloned().ok_or(
                    BackendError::Command {
                        command: "doppler secrets get".to_string(),
                        stderr: "Could not find requested secret".to_string(),
                    },
                ),
                "set" if self.fail_writes => Err(BackendError::Command {
                    command: "doppler secrets set".to_string(),
                    stderr: "forbidden".to_string(),
                }),
                "set" => {
                    self.secrets
                        .lock()
                        .unwrap()
                        .insert(name, stdin.unwrap_or_default().to_string());
                    Ok(String::new())
                }
                _ => unreachable!(),
            }
        }
    }

    #[tokio::test]
    async fn test_round_trip_through_cli() {
        let cli = Arc::new(FakeDoppler::default());
        let handler = DopplerLocationHandler::new(cli);
        let metadata = LocationMetadata::new();

        assert!(handler.read_value("CF_TOKEN", &metadata).await.is_none());
        assert!(handler.write_value("CF_TOKEN", "v2", &metadata).await);
        assert_eq!(handler.read_value("CF_TOKEN", &metadata).await.as_deref(), Some("v2"));
        assert_eq!(handler.backup_value("CF_TOKEN", &metadata).await.as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_write_failure_is_false() {
        let cli = Arc::new(FakeDoppler {
            fail_writes: true,
            ..Default::default()
        });
        let handler = DopplerLocationHandler::new(cli);
        assert!(!handler.write_value("X", "v", &LocationMetadata::new()).await);
    }
}
