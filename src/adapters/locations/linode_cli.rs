use async_trait::async_trait;

use super::{backup_file, load_file, read_file, restore_file, store_file};
use crate::domain::models::LocationMetadata;
use crate::domain::ports::LocationHandler;

const TOKEN_PREFIX: &str = "token =";

/// `~/.config/linode-cli`: INI file with a `token = ...` line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinodeCliHandler;

#[async_trait]
impl LocationHandler for LinodeCliHandler {
    fn kind(&self) -> &str {
        "linode-cli"
    }

    async fn read_value(&self, path: &str, _metadata: &LocationMetadata) -> Option<String> {
        let contents = read_file(path).await?;
        contents
            .lines()
            .find_map(|line| line.strip_prefix(TOKEN_PREFIX))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }

    async fn write_value(&self, path: &str, value: &str, _metadata: &LocationMetadata) -> bool {
        let new_line = format!("{TOKEN_PREFIX} {value}");

        let contents = match load_file(path).await {
            Ok(Some(existing)) => {
                let mut replaced = false;
                let mut lines: Vec<String> = existing
                    .lines()
                    .map(|line| {
                        if line.starts_with(TOKEN_PREFIX) {
                            replaced = true;
                            new_line.clone()
                        } else {
                            line.to_string()
                        }
                    })
                    .collect();
                if !replaced {
                    lines.push(new_line);
                }
                lines.join("\n") + "\n"
            }
            Ok(None) => format!("[DEFAULT]\n{new_line}\n"),
            Err(_) => return false,
        };

        store_file(path, &contents).await
    }

    async fn backup_value(&self, path: &str, _metadata: &LocationMetadata) -> Option<String> {
        backup_file(path).await
    }

    async fn rollback(&self, path: &str, snapshot: &str, _metadata: &LocationMetadata) -> bool {
        restore_file(path, snapshot).await
    }
}
