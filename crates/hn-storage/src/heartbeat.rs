//! Per-application "last access" heartbeats.
//!
//! Stored in a `KeyValueStore` as `"<prefix>:<app_id>"` ->
//! `{"timestamp": <ms since epoch>}`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::StorageResult;
use crate::kv::KeyValueStore;

pub const DEFAULT_HEARTBEAT_PREFIX: &str = "last-simulation-access";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatRecord {
    pub timestamp: i64,
}

#[derive(Clone)]
pub struct HeartbeatLog {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    prefix: String,
}

impl fmt::Debug for HeartbeatLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeartbeatLog")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl HeartbeatLog {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            prefix: DEFAULT_HEARTBEAT_PREFIX.to_string(),
        }
    }

    /// Heartbeats on the system clock.
    pub fn system(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, Arc::new(SystemClock))
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn key_for(&self, app_id: &str) -> String {
        format!("{}:{}", self.prefix, app_id)
    }

    /// Record an access at the current time.
    pub fn touch(&self, app_id: &str) -> StorageResult<()> {
        let record = HeartbeatRecord {
            timestamp: self.clock.now_ms(),
        };
        let value = serde_json::to_string(&record)?;
        self.store.set(&self.key_for(app_id), &value)
    }

    pub fn forget(&self, app_id: &str) -> StorageResult<()> {
        self.store.remove(&self.key_for(app_id))
    }

    /// Last access in ms, or `None` when missing or unparseable.
    pub fn last_access(&self, app_id: &str) -> StorageResult<Option<i64>> {
        Ok(self
            .store
            .get(&self.key_for(app_id))?
            .and_then(|raw| parse_record(&raw)))
    }

    /// Every app id with a heartbeat under this prefix, with its parsed timestamp.
    pub fn entries(&self) -> StorageResult<Vec<(String, Option<i64>)>> {
        let marker = format!("{}:", self.prefix);
        let mut entries = Vec::new();
        for key in self.store.keys()? {
            let Some(app_id) = key.strip_prefix(&marker) else {
                continue;
            };
            let timestamp = self.store.get(&key)?.and_then(|raw| parse_record(&raw));
            entries.push((app_id.to_string(), timestamp));
        }
        Ok(entries)
    }

    /// Refresh, logging instead of failing. Used on storage hot paths.
    pub(crate) fn touch_quietly(&self, app_id: &str) {
        if let Err(e) = self.touch(app_id) {
            tracing::warn!(app_id, error = %e, "failed to refresh heartbeat");
        }
    }
}

fn parse_record(raw: &str) -> Option<i64> {
    serde_json::from_str::<HeartbeatRecord>(raw)
        .ok()
        .map(|record| record.timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::kv::MemoryKeyValueStore;

    fn log_at(now_ms: i64) -> (HeartbeatLog, MemoryKeyValueStore, ManualClock) {
        let store = MemoryKeyValueStore::new();
        let clock = ManualClock::at(now_ms);
        let log = HeartbeatLog::new(Arc::new(store.clone()), Arc::new(clock.clone()));
        (log, store, clock)
    }

    #[test]
    fn touch_writes_json_record_under_prefixed_key() {
        let (log, store, _clock) = log_at(1_700_000_000_000);
        log.touch("app-1").unwrap();

        let raw = store.get("last-simulation-access:app-1").unwrap().unwrap();
        assert_eq!(raw, r#"{"timestamp":1700000000000}"#);
        assert_eq!(log.last_access("app-1").unwrap(), Some(1_700_000_000_000));
    }

    #[test]
    fn entries_skip_foreign_keys_and_flag_garbage() {
        let (log, store, _clock) = log_at(42);
        log.touch("good").unwrap();
        store.set("last-simulation-access:bad", "{oops").unwrap();
        store.set("unrelated", "x").unwrap();

        let mut entries = log.entries().unwrap();
        entries.sort();
        assert_eq!(
            entries,
            vec![("bad".to_string(), None), ("good".to_string(), Some(42))]
        );
    }

    #[test]
    fn system_log_stamps_wall_clock() {
        let log = HeartbeatLog::system(Arc::new(MemoryKeyValueStore::new()));
        log.touch("app").unwrap();
        assert!(log.last_access("app").unwrap().unwrap() > 1_577_836_800_000);
    }

    #[test]
    fn custom_prefix_and_forget() {
        let (log, store, clock) = log_at(10);
        let log = log.with_prefix("hb");
        log.touch("a").unwrap();
        clock.set(20);
        log.touch("a").unwrap();
        assert_eq!(log.last_access("a").unwrap(), Some(20));
        assert!(store.get("hb:a").unwrap().is_some());

        log.forget("a").unwrap();
        assert_eq!(log.last_access("a").unwrap(), None);
    }
}
