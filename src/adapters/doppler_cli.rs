//! Runner for the `doppler` command-line tool.
//!
//! Both the Doppler registry backend and the `doppler` location handler shell
//! out through [`DopplerCli`], so tests can substitute a scripted runner.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::domain::ports::BackendError;

/// Executes `doppler` with the given arguments and returns trimmed stdout.
#[async_trait]
pub trait DopplerCli: Send + Sync {
    /// `stdin` is piped to the process when given (used for secret values so
    /// they never appear in the process table).
    async fn run(&self, args: &[String], stdin: Option<&str>) -> Result<String, BackendError>;
}

/// Spawns the real `doppler` binary.
#[derive(Debug, Clone)]
pub struct ProcessDopplerCli {
    binary: String,
}

impl ProcessDopplerCli {
    pub fn new() -> Self {
        Self {
            binary: "doppler".to_string(),
        }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for ProcessDopplerCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DopplerCli for ProcessDopplerCli {
    async fn run(&self, args: &[String], stdin: Option<&str>) -> Result<String, BackendError> {
        let command_line = format!("{} {}", self.binary, args.join(" "));
        debug!(command = %redact_assignments(args), "running doppler");

        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    BackendError::Unavailable(
                        "Doppler CLI not found. Install it from https://docs.doppler.com/docs/install-cli and run `doppler login`"
                            .to_string(),
                    )
                } else {
                    BackendError::io(&self.binary, e)
                }
            })?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(input.as_bytes())
                .await
                .map_err(|e| BackendError::io(&self.binary, e))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| BackendError::io(&self.binary, e))?;

        if !output.status.success() {
            return Err(BackendError::Command {
                command: command_line,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Arguments for `doppler secrets get NAME --plain`.
pub fn secrets_get_args(name: &str, project: Option<&str>, config: Option<&str>) -> Vec<String> {
    let mut args = vec!["secrets".to_string(), "get".to_string(), name.to_string()];
    push_scope(&mut args, project, config);
    args.push("--plain".to_string());
    args
}

/// Arguments for `doppler secrets set NAME` (value on stdin).
pub fn secrets_set_args(name: &str, project: Option<&str>, config: Option<&str>) -> Vec<String> {
    let mut args = vec!["secrets".to_string(), "set".to_string(), name.to_string()];
    push_scope(&mut args, project, config);
    args.push("--silent".to_string());
    args
}

fn push_scope(args: &mut Vec<String>, project: Option<&str>, config: Option<&str>) {
    if let Some(project) = project {
        args.push("--project".to_string());
        args.push(project.to_string());
    }
    if let Some(config) = config {
        args.push("--config".to_string());
        args.push(config.to_string());
    }
}

/// `NAME=value` arguments with the value hidden, for logging.
fn redact_assignments(args: &[String]) -> String {
    args.iter()
        .map(|arg| match arg.split_once('=') {
            Some((name, _)) if !arg.starts_with("--") => format!("{name}=***"),
            _ => arg.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a failed `secrets get` means the secret simply does not exist.
pub fn is_missing_secret(err: &BackendError) -> bool {
    match err {
        BackendError::Command { stderr, .. } => {
            let stderr = stderr.to_lowercase();
            stderr.contains("not find") || stderr.contains("not found")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_args_with_scope() {
        let args = secrets_get_args("TOKEN", Some("infra"), Some("prd"));
        assert_eq!(
            args,
            vec!["secrets", "get", "TOKEN", "--project", "infra", "--config", "prd", "--plain"]
        );
    }

    #[test]
    fn test_set_args_without_scope() {
        let args = secrets_set_args("TOKEN", None, None);
        assert_eq!(args, vec!["secrets", "set", "TOKEN", "--silent"]);
    }

    #[test]
    fn test_redact_assignments() {
        let args: Vec<String> = ["secrets", "set", "TOKEN=abc123", "--project=x"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(redact_assignments(&args), "secrets set TOKEN=*** --project=x");
    }

    #[test]
    fn test_missing_secret_detection() {
        let err = BackendError::Command {
            command: "doppler secrets get X".to_string(),
            stderr: "Doppler Error: Could not find requested secret: X".to_string(),
        };
        assert!(is_missing_secret(&err));

        let err = BackendError::Command {
            command: "doppler secrets get X".to_string(),
            stderr: "Unable to authenticate".to_string(),
        };
        assert!(!is_missing_secret(&err));
        assert!(!is_missing_secret(&BackendError::Unavailable("x".to_string())));
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let cli = ProcessDopplerCli::with_binary("tokn-test-no-such-doppler-binary");
        let err = cli.run(&["--version".to_string()], None).await.unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)));
    }
}
