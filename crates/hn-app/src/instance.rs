//! One running application instance and its private storage namespace.

use std::sync::Arc;

use hn_storage::{
    Clock, FsStorage, FsStorageRoot, GarbageCollector, GcReport, HeartbeatLog,
    JsonFileKeyValueStore, PrivateAppStorage, SystemClock,
};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::AppResult;

/// An application session.
///
/// Starting a fresh instance sweeps stale namespaces left by earlier sessions
/// before claiming a new one.
#[derive(Debug)]
pub struct AppInstance {
    app_id: String,
    root: FsStorageRoot,
    heartbeats: HeartbeatLog,
    storage: FsStorage,
    collector: GarbageCollector,
}

impl AppInstance {
    /// New session with a random id. Runs the startup sweep first.
    pub fn start(config: &AppConfig) -> AppResult<Self> {
        Self::start_with_clock(config, Arc::new(SystemClock))
    }

    pub fn start_with_clock(config: &AppConfig, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let (root, heartbeats, collector) = wire(config, clock);
        let report = collector.sweep(&root)?;
        if !report.removed.is_empty() {
            tracing::info!(removed = report.removed.len(), "startup sweep removed stale sessions");
        }
        adopt_untracked(&root, &heartbeats)?;
        let app_id = Uuid::new_v4().to_string();
        Self::assemble(app_id, root, heartbeats, collector)
    }

    /// Attach to an existing session without sweeping.
    pub fn attach(config: &AppConfig, app_id: &str) -> AppResult<Self> {
        let (root, heartbeats, collector) = wire(config, Arc::new(SystemClock));
        Self::assemble(app_id.to_string(), root, heartbeats, collector)
    }

    fn assemble(
        app_id: String,
        root: FsStorageRoot,
        heartbeats: HeartbeatLog,
        collector: GarbageCollector,
    ) -> AppResult<Self> {
        let storage = root.app(&app_id)?;
        tracing::debug!(app_id = %app_id, root = %root.dir().display(), "app instance ready");
        Ok(Self {
            app_id,
            root,
            heartbeats,
            storage,
            collector,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn storage(&self) -> &FsStorage {
        &self.storage
    }

    pub fn root(&self) -> &FsStorageRoot {
        &self.root
    }

    pub fn heartbeats(&self) -> &HeartbeatLog {
        &self.heartbeats
    }

    /// Sweep stale namespaces now.
    pub fn sweep(&self) -> AppResult<GcReport> {
        Ok(self.collector.sweep(&self.root)?)
    }

    /// Drop this session's entries and heartbeat.
    pub fn clear(&self) -> AppResult<()> {
        Ok(self.storage.clear()?)
    }
}

fn wire(
    config: &AppConfig,
    clock: Arc<dyn Clock>,
) -> (FsStorageRoot, HeartbeatLog, GarbageCollector) {
    let store = JsonFileKeyValueStore::new(config.heartbeat_file());
    let heartbeats =
        HeartbeatLog::new(Arc::new(store), clock).with_prefix(config.heartbeat_prefix.clone());
    let root = FsStorageRoot::new(config.storage_root()).with_heartbeats(heartbeats.clone());
    let collector = GarbageCollector::new(heartbeats.clone()).with_threshold(config.stale_threshold());
    (root, heartbeats, collector)
}

/// Give session trees that lost their heartbeat a fresh one, so a later sweep
/// can still reclaim them.
fn adopt_untracked(root: &FsStorageRoot, heartbeats: &HeartbeatLog) -> AppResult<()> {
    for app_id in root.app_ids()? {
        if heartbeats.last_access(&app_id)?.is_none() {
            heartbeats.touch(&app_id)?;
            tracing::info!(app_id = %app_id, "tracking session without a heartbeat");
        }
    }
    Ok(())
}

/// Sweep stale namespaces without opening a session.
pub fn sweep_stale_sessions(config: &AppConfig) -> AppResult<GcReport> {
    let (root, _, collector) = wire(config, Arc::new(SystemClock));
    Ok(collector.sweep(&root)?)
}
