//! In-memory storage for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::error::StorageResult;
use crate::heartbeat::HeartbeatLog;
use crate::storage::{PrivateAppStorage, StorageRoot, clamp_range};

type AppEntries = HashMap<String, Arc<[u8]>>;

/// Table of all applications' entries. Clones share the table.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    apps: Arc<Mutex<HashMap<String, AppEntries>>>,
}

static PROCESS_WIDE: OnceLock<MemoryBackend> = OnceLock::new();

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The backend shared by every caller in this process.
    pub fn process_wide() -> Self {
        PROCESS_WIDE.get_or_init(MemoryBackend::new).clone()
    }

    pub fn app(&self, app_id: &str) -> MemoryStorage {
        self.apps().entry(app_id.to_string()).or_default();
        MemoryStorage {
            app_id: app_id.to_string(),
            backend: self.clone(),
            heartbeats: None,
        }
    }

    /// Drop every application's entries.
    pub fn reset(&self) {
        self.apps().clear();
    }

    pub fn app_count(&self) -> usize {
        self.apps().len()
    }

    fn apps(&self) -> MutexGuard<'_, HashMap<String, AppEntries>> {
        self.apps.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageRoot for MemoryBackend {
    fn remove_app(&self, app_id: &str) -> StorageResult<()> {
        self.apps().remove(app_id);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MemoryStorage {
    app_id: String,
    backend: MemoryBackend,
    heartbeats: Option<HeartbeatLog>,
}

impl MemoryStorage {
    pub fn with_heartbeats(mut self, heartbeats: HeartbeatLog) -> Self {
        self.heartbeats = Some(heartbeats);
        self
    }

    pub fn has(&self, key: &str) -> bool {
        self.backend
            .apps()
            .get(&self.app_id)
            .is_some_and(|entries| entries.contains_key(key))
    }

    pub fn count(&self) -> usize {
        self.backend
            .apps()
            .get(&self.app_id)
            .map_or(0, HashMap::len)
    }

    fn entry(&self, key: &str) -> Option<Arc<[u8]>> {
        self.backend.apps().get(&self.app_id)?.get(key).cloned()
    }

    fn touch(&self) {
        if let Some(heartbeats) = &self.heartbeats {
            heartbeats.touch_quietly(&self.app_id);
        }
    }
}

impl PrivateAppStorage for MemoryStorage {
    fn app_id(&self) -> &str {
        &self.app_id
    }

    fn save(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        self.backend
            .apps()
            .entry(self.app_id.clone())
            .or_default()
            .insert(key.to_string(), Arc::from(bytes));
        self.touch();
        Ok(())
    }

    fn read_slice(&self, key: &str, offset: u64, length: u64) -> Option<Vec<u8>> {
        let entry = self.entry(key)?;
        let (start, end) = clamp_range(entry.len() as u64, offset, length);
        self.touch();
        Some(entry[start as usize..end as usize].to_vec())
    }

    fn size(&self, key: &str) -> Option<u64> {
        self.entry(key).map(|entry| entry.len() as u64)
    }

    fn clear(&self) -> StorageResult<()> {
        self.backend.remove_app(&self.app_id)?;
        if let Some(heartbeats) = &self.heartbeats {
            heartbeats.forget(&self.app_id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_of_backend_share_entries() {
        let backend = MemoryBackend::new();
        let writer = backend.app("a");
        writer.save("k", b"hello").unwrap();

        let reader = backend.clone().app("a");
        assert!(reader.has("k"));
        assert_eq!(reader.count(), 1);
        assert_eq!(reader.read_slice("k", 1, 3), Some(b"ell".to_vec()));
        assert_eq!(reader.size("k"), Some(5));
        assert_eq!(reader.read_slice("nope", 0, 1), None);
    }

    #[test]
    fn apps_are_isolated_and_reset_clears_all() {
        let backend = MemoryBackend::new();
        backend.app("a").save("k", b"1").unwrap();
        let b = backend.app("b");
        assert!(!b.has("k"));
        assert_eq!(backend.app_count(), 2);

        backend.reset();
        assert_eq!(backend.app_count(), 0);
        assert!(!backend.app("a").has("k"));
    }

    #[test]
    fn clear_is_idempotent() {
        let backend = MemoryBackend::new();
        let storage = backend.app("a");
        storage.save("k", b"1").unwrap();
        storage.clear().unwrap();
        storage.clear().unwrap();
        assert_eq!(storage.count(), 0);
        assert_eq!(storage.read_slice("k", 0, 1), None);
    }

    #[test]
    fn process_wide_backend_is_shared() {
        let first = MemoryBackend::process_wide();
        first.app("process-wide-test").save("k", b"v").unwrap();
        assert!(MemoryBackend::process_wide().app("process-wide-test").has("k"));
        first.remove_app("process-wide-test").unwrap();
    }
}
