//! Status color mapping for CLI output.
//!
//! `console` disables styling on its own when stdout is not a terminal.

use comfy_table::Color;
use console::{style, StyledObject};

use crate::domain::models::CredentialStatus;

/// Colored status label: green active, yellow expiring soon, red expired.
pub fn colorize_status(status: CredentialStatus) -> StyledObject<String> {
    let text = format!("{} {}", status_icon(status), status.as_str());
    match status {
        CredentialStatus::Active => style(text).green(),
        CredentialStatus::ExpiringSoon => style(text).yellow(),
        CredentialStatus::Expired => style(text).red().bold(),
    }
}

/// Plain-text marker that survives when colors are off.
pub fn status_icon(status: CredentialStatus) -> &'static str {
    match status {
        CredentialStatus::Active => "\u{2713}",
        CredentialStatus::ExpiringSoon => "\u{26a0}",
        CredentialStatus::Expired => "\u{2717}",
    }
}

/// Table cell color for a status.
pub const fn status_color(status: CredentialStatus) -> Color {
    match status {
        CredentialStatus::Active => Color::Green,
        CredentialStatus::ExpiringSoon => Color::Yellow,
        CredentialStatus::Expired => Color::Red,
    }
}

/// Styled label for detail views (bold + dimmed colon).
pub fn label(name: &str) -> String {
    format!("{}{}", style(name).bold(), style(":").dim())
}

/// Section header with underline.
pub fn section_header(title: &str) -> String {
    format!("\n{}", style(title).bold().underlined())
}
