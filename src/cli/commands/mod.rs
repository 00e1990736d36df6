//! CLI command implementations.

pub mod backend;
pub mod info;
pub mod remove;
pub mod rotate;
pub mod status;
pub mod sync;
pub mod track;
pub mod update;

use crate::cli::display::{action_failure, action_success, CommandOutput};

use info::CredentialOutput;

/// Result of a command that changes one credential.
#[derive(Debug, serde::Serialize)]
pub struct ActionOutput {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<CredentialOutput>,
}

impl CommandOutput for ActionOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![if self.success {
            action_success(&self.message)
        } else {
            action_failure(&self.message)
        }];

        if let Some(credential) = &self.credential {
            lines.push(format!("  Name: {}", credential.name));
            lines.push(format!("  Service: {}", credential.service));
            lines.push(format!("  Type: {}", credential.rotation_type));
            if let Some(expires_at) = credential.expires_at {
                lines.push(format!("  Expires: {}", expires_at.format("%Y-%m-%d")));
            }
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
