//! Akamai `.edgerc` files.
//!
//! An `.edgerc` is INI with one section per API client, each holding `host`,
//! `client_token`, `client_secret` and `access_token`. Rotation replaces
//! `client_secret` (the primary value) and `client_token` (the secondary
//! value); `host` and `access_token` belong to the API client and never change.

use async_trait::async_trait;

use super::{backup_file, load_file, read_file, restore_file, store_file};
use crate::domain::models::{param_keys, LocationMetadata};
use crate::domain::ports::LocationHandler;

pub const DEFAULT_SECTION: &str = "default";
const CLIENT_SECRET: &str = "client_secret";

/// Parsed `.edgerc`, keeping section and key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgercFile {
    sections: Vec<(String, Vec<(String, String)>)>,
}

impl EdgercFile {
    /// Parse INI text. `;` and `#` start comment lines; a `;comment` after a
    /// section header is ignored. Keys outside any section are an error.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let mut file = Self::default();
        let mut current = None;

        for (number, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest
                    .split_once(']')
                    .map(|(name, _)| name.trim())
                    .ok_or_else(|| format!("line {}: unterminated section header", number + 1))?;
                current = Some(file.section_index(name));
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .or_else(|| line.split_once(':'))
                .ok_or_else(|| format!("line {}: expected key = value", number + 1))?;
            let index =
                current.ok_or_else(|| format!("line {}: key outside of a section", number + 1))?;
            upsert(&mut file.sections[index].1, key.trim(), value.trim());
        }

        Ok(file)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|(name, _)| name == section)?
            .1
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.iter().any(|(name, _)| name == section)
    }

    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let index = self.section_index(section);
        upsert(&mut self.sections[index].1, key, value);
    }

    /// Render back to INI. Comments are not preserved.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, entries) in &self.sections {
            out.push_str(&format!("[{name}]\n"));
            for (key, value) in entries {
                out.push_str(&format!("{key} = {value}\n"));
            }
            out.push('\n');
        }
        out
    }

    fn section_index(&mut self, section: &str) -> usize {
        match self.sections.iter().position(|(name, _)| name == section) {
            Some(index) => index,
            None => {
                self.sections.push((section.to_string(), Vec::new()));
                self.sections.len() - 1
            }
        }
    }
}

fn upsert(entries: &mut Vec<(String, String)>, key: &str, value: &str) {
    match entries.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = value.to_string(),
        None => entries.push((key.to_string(), value.to_string())),
    }
}

fn section(metadata: &LocationMetadata) -> &str {
    metadata
        .get(param_keys::SECTION)
        .map(String::as_str)
        .unwrap_or(DEFAULT_SECTION)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EdgercHandler;

#[async_trait]
impl LocationHandler for EdgercHandler {
    fn kind(&self) -> &str {
        "edgerc"
    }

    async fn read_value(&self, path: &str, metadata: &LocationMetadata) -> Option<String> {
        let file = EdgercFile::parse(&read_file(path).await?).ok()?;
        file.get(section(metadata), CLIENT_SECRET).map(str::to_string)
    }

    /// Writes `client_secret`, plus `client_token` when the metadata carries one.
    async fn write_value(&self, path: &str, value: &str, metadata: &LocationMetadata) -> bool {
        let mut file = match load_file(path).await {
            Ok(Some(contents)) => match EdgercFile::parse(&contents) {
                Ok(file) => file,
                Err(_) => return false,
            },
            Ok(None) => EdgercFile::default(),
            Err(_) => return false,
        };

        let section = section(metadata);
        file.set(section, CLIENT_SECRET, value);
        if let Some(client_token) = metadata.get(param_keys::CLIENT_TOKEN).filter(|t| !t.is_empty()) {
            file.set(section, param_keys::CLIENT_TOKEN, client_token);
        }

        store_file(path, &file.render()).await
    }

    async fn backup_value(&self, path: &str, _metadata: &LocationMetadata) -> Option<String> {
        backup_file(path).await
    }

    async fn rollback(&self, path: &str, snapshot: &str, _metadata: &LocationMetadata) -> bool {
        restore_file(path, snapshot).await
    }
}
