use async_trait::async_trait;

use crate::domain::models::LocationMetadata;

/// Reads, writes, and snapshots a credential value at one kind of location.
///
/// No method propagates an error. Missing files, malformed content, and
/// network failures surface as `None` or `false`.
///
/// Writes touch only the fields the handler owns; everything else already at
/// the location (other INI sections, other JSON keys, other lines) survives.
/// Handlers backed by local files set owner-only permissions after every
/// write, rollback writes included.
#[async_trait]
pub trait LocationHandler: Send + Sync {
    /// Location kind this handler serves (e.g. `edgerc`)
    fn kind(&self) -> &str;

    async fn read_value(&self, path: &str, metadata: &LocationMetadata) -> Option<String>;

    async fn write_value(&self, path: &str, value: &str, metadata: &LocationMetadata) -> bool;

    /// Capture enough state to fully restore the location via [`rollback`](Self::rollback).
    ///
    /// File handlers return the whole file, not just the owned field.
    /// `None` means there is nothing to restore (e.g. the file does not exist).
    async fn backup_value(&self, path: &str, metadata: &LocationMetadata) -> Option<String>;

    async fn rollback(&self, path: &str, snapshot: &str, metadata: &LocationMetadata) -> bool {
        self.write_value(path, snapshot, metadata).await
    }
}
