//! Staleness garbage collection of application namespaces.

use std::time::Duration;

use serde::Serialize;

use crate::error::{StorageError, StorageResult};
use crate::heartbeat::HeartbeatLog;
use crate::storage::StorageRoot;

/// Applications untouched for longer than this are removed.
pub const DEFAULT_STALE_THRESHOLD: Duration = Duration::from_secs(14 * 24 * 60 * 60);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GcReport {
    pub removed: Vec<String>,
    pub kept: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GarbageCollector {
    heartbeats: HeartbeatLog,
    threshold: Duration,
}

impl GarbageCollector {
    pub fn new(heartbeats: HeartbeatLog) -> Self {
        Self {
            heartbeats,
            threshold: DEFAULT_STALE_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: Duration) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Remove every application whose heartbeat is older than the threshold
    /// or cannot be parsed.
    ///
    /// An application whose namespace cannot be removed keeps its heartbeat so
    /// the next sweep retries it. A heartbeat whose app id is not a valid name
    /// has no namespace and is dropped.
    pub fn sweep(&self, root: &dyn StorageRoot) -> StorageResult<GcReport> {
        let now = self.heartbeats.now_ms();
        let threshold_ms = i64::try_from(self.threshold.as_millis()).unwrap_or(i64::MAX);
        let mut report = GcReport::default();

        for (app_id, timestamp) in self.heartbeats.entries()? {
            let stale = match timestamp {
                Some(ts) => now.saturating_sub(ts) > threshold_ms,
                None => true,
            };
            if !stale {
                report.kept.push(app_id);
                continue;
            }

            match root.remove_app(&app_id) {
                Ok(()) => {
                    self.heartbeats.forget(&app_id)?;
                    tracing::info!(app_id = %app_id, last_access = ?timestamp, "removed stale app storage");
                    report.removed.push(app_id);
                }
                Err(StorageError::InvalidName { .. }) => {
                    self.heartbeats.forget(&app_id)?;
                    tracing::warn!(app_id = %app_id, "dropped heartbeat with an invalid app id");
                    report.removed.push(app_id);
                }
                Err(e) => {
                    tracing::warn!(app_id = %app_id, error = %e, "failed to remove stale app storage");
                    report.kept.push(app_id);
                }
            }
        }

        tracing::debug!(
            removed = report.removed.len(),
            kept = report.kept.len(),
            "storage sweep finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::clock::ManualClock;
    use crate::fs::FsStorageRoot;
    use crate::kv::{KeyValueStore, MemoryKeyValueStore};
    use crate::memory::MemoryBackend;
    use crate::storage::PrivateAppStorage;

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    fn setup() -> (GarbageCollector, HeartbeatLog, MemoryKeyValueStore, ManualClock) {
        let store = MemoryKeyValueStore::new();
        let clock = ManualClock::at(100 * DAY_MS);
        let log = HeartbeatLog::new(Arc::new(store.clone()), Arc::new(clock.clone()));
        (GarbageCollector::new(log.clone()), log, store, clock)
    }

    #[test]
    fn removes_old_and_keeps_recent() {
        let (gc, log, _store, clock) = setup();
        let backend = MemoryBackend::new();

        let old = backend.app("old").with_heartbeats(log.clone());
        old.save("results.out", b"x").unwrap();
        clock.advance(Duration::from_secs(10 * 24 * 60 * 60));
        let recent = backend.app("recent").with_heartbeats(log.clone());
        recent.save("results.out", b"y").unwrap();
        clock.advance(Duration::from_secs(5 * 24 * 60 * 60));

        let report = gc.sweep(&backend).unwrap();
        assert_eq!(report.removed, vec!["old".to_string()]);
        assert_eq!(report.kept, vec!["recent".to_string()]);
        assert!(!old.has("results.out"));
        assert!(recent.has("results.out"));
        assert_eq!(log.last_access("old").unwrap(), None);
    }

    #[test]
    fn unparseable_heartbeat_is_stale() {
        let (gc, _log, store, _clock) = setup();
        store.set("last-simulation-access:broken", "garbage").unwrap();
        store.set("last-simulation-access:empty", "{}").unwrap();

        let report = gc.sweep(&MemoryBackend::new()).unwrap();
        assert_eq!(report.removed, vec!["broken".to_string(), "empty".to_string()]);
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn heartbeat_with_invalid_app_id_is_dropped() {
        let (gc, _log, store, _clock) = setup();
        store
            .set("last-simulation-access:a/b", r#"{"timestamp":0}"#)
            .unwrap();
        let root = FsStorageRoot::new(std::env::temp_dir().join("hn_gc_invalid_unused"));

        let report = gc.sweep(&root).unwrap();
        assert_eq!(report.removed, vec!["a/b".to_string()]);
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn nothing_happens_without_heartbeats() {
        let (gc, _log, store, _clock) = setup();
        store.set("other-prefix:app", r#"{"timestamp":0}"#).unwrap();
        let backend = MemoryBackend::new();
        backend.app("orphaned").save("k", b"v").unwrap();

        let report = gc.sweep(&backend).unwrap();
        assert_eq!(report, GcReport::default());
        assert!(backend.app("orphaned").has("k"));
    }

    #[test]
    fn threshold_is_exclusive() {
        let (gc, log, _store, clock) = setup();
        let gc = gc.with_threshold(Duration::from_millis(1_000));
        log.touch("edge").unwrap();
        clock.advance(Duration::from_millis(1_000));
        assert_eq!(gc.sweep(&MemoryBackend::new()).unwrap().kept, vec!["edge".to_string()]);
        clock.advance(Duration::from_millis(1));
        assert_eq!(gc.sweep(&MemoryBackend::new()).unwrap().removed, vec!["edge".to_string()]);
    }
}
