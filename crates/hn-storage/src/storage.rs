//! Storage contracts.

use crate::error::StorageResult;

/// Byte entries private to one application instance.
///
/// Reads never fail loudly: a missing or unreadable entry is `None`.
pub trait PrivateAppStorage: Send + Sync {
    fn app_id(&self) -> &str;

    /// Create or replace `key`. Refreshes the heartbeat.
    fn save(&self, key: &str, bytes: &[u8]) -> StorageResult<()>;

    /// Bytes `[offset, offset + length)` of `key`, clamped to the entry's end.
    /// Refreshes the heartbeat on success.
    fn read_slice(&self, key: &str, offset: u64, length: u64) -> Option<Vec<u8>>;

    fn size(&self, key: &str) -> Option<u64>;

    /// Remove every entry of this application and its heartbeat. Idempotent.
    fn clear(&self) -> StorageResult<()>;
}

/// Container of application namespaces.
pub trait StorageRoot: Send + Sync {
    /// Delete an application's whole namespace. Missing namespaces are fine.
    fn remove_app(&self, app_id: &str) -> StorageResult<()>;
}

pub(crate) fn clamp_range(len: u64, offset: u64, length: u64) -> (u64, u64) {
    let start = offset.min(len);
    let end = offset.saturating_add(length).min(len);
    (start, end)
}
