//! Durable file-system storage: `<root>/<app_id>/<key>`.

use std::fs::{self, File};
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{StorageError, StorageResult};
use crate::heartbeat::HeartbeatLog;
use crate::names::check_component;
use crate::storage::{PrivateAppStorage, StorageRoot, clamp_range};

/// Directory holding one sub-directory per application.
#[derive(Debug, Clone)]
pub struct FsStorageRoot {
    dir: PathBuf,
    heartbeats: Option<HeartbeatLog>,
}

impl FsStorageRoot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            heartbeats: None,
        }
    }

    /// Record heartbeats for every storage handed out by this root.
    pub fn with_heartbeats(mut self, heartbeats: HeartbeatLog) -> Self {
        self.heartbeats = Some(heartbeats);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Storage for one application. The directory is created on first save.
    pub fn app(&self, app_id: &str) -> StorageResult<FsStorage> {
        check_component("app id", app_id)?;
        Ok(FsStorage {
            app_id: app_id.to_string(),
            app_dir: self.dir.join(app_id),
            heartbeats: self.heartbeats.clone(),
        })
    }

    /// Application ids that currently have a directory.
    pub fn app_ids(&self) -> StorageResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.dir, e)),
        };
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(&self.dir, e))?;
            if entry.path().is_dir() {
                ids.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

impl StorageRoot for FsStorageRoot {
    fn remove_app(&self, app_id: &str) -> StorageResult<()> {
        check_component("app id", app_id)?;
        remove_dir_if_present(&self.dir.join(app_id))
    }
}

fn remove_dir_if_present(dir: &Path) -> StorageResult<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::io(dir, e)),
    }
}

#[derive(Debug, Clone)]
pub struct FsStorage {
    app_id: String,
    app_dir: PathBuf,
    heartbeats: Option<HeartbeatLog>,
}

impl FsStorage {
    pub fn dir(&self) -> &Path {
        &self.app_dir
    }

    fn entry_path(&self, key: &str) -> StorageResult<PathBuf> {
        check_component("key", key)?;
        Ok(self.app_dir.join(key))
    }

    fn touch(&self) {
        if let Some(heartbeats) = &self.heartbeats {
            heartbeats.touch_quietly(&self.app_id);
        }
    }

    fn read_range(path: &Path, offset: u64, length: u64) -> std::io::Result<Vec<u8>> {
        let mut file = File::open(path)?;
        let len = file.metadata()?.len();
        let (start, end) = clamp_range(len, offset, length);
        file.seek(SeekFrom::Start(start))?;
        let mut bytes = Vec::with_capacity((end - start) as usize);
        file.take(end - start).read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl PrivateAppStorage for FsStorage {
    fn app_id(&self) -> &str {
        &self.app_id
    }

    fn save(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let path = self.entry_path(key)?;
        fs::create_dir_all(&self.app_dir).map_err(|e| StorageError::io(&self.app_dir, e))?;
        fs::write(&path, bytes).map_err(|e| StorageError::io(&path, e))?;
        tracing::debug!(app_id = %self.app_id, key, bytes = bytes.len(), "entry saved");
        self.touch();
        Ok(())
    }

    fn read_slice(&self, key: &str, offset: u64, length: u64) -> Option<Vec<u8>> {
        let path = match self.entry_path(key) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(app_id = %self.app_id, error = %e, "rejected read");
                return None;
            }
        };
        match Self::read_range(&path, offset, length) {
            Ok(bytes) => {
                self.touch();
                Some(bytes)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(app_id = %self.app_id, key, "entry not found");
                None
            }
            Err(e) => {
                tracing::warn!(app_id = %self.app_id, key, error = %e, "entry unreadable");
                None
            }
        }
    }

    fn size(&self, key: &str) -> Option<u64> {
        let path = self.entry_path(key).ok()?;
        fs::metadata(path).ok().map(|meta| meta.len())
    }

    fn clear(&self) -> StorageResult<()> {
        remove_dir_if_present(&self.app_dir)?;
        if let Some(heartbeats) = &self.heartbeats {
            heartbeats.forget(&self.app_id)?;
        }
        tracing::debug!(app_id = %self.app_id, "app storage cleared");
        Ok(())
    }
}
