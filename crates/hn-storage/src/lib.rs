//! hn-storage: private, per-application persistent storage.
//!
//! Each application instance owns a namespace of opaque byte entries that
//! supports byte-range reads. Every successful write or read refreshes a
//! per-application heartbeat, and the garbage collector deletes namespaces
//! whose heartbeat has gone stale.

pub mod clock;
pub mod error;
pub mod fs;
pub mod gc;
pub mod heartbeat;
pub mod kv;
pub mod memory;
mod names;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{StorageError, StorageResult};
pub use fs::{FsStorage, FsStorageRoot};
pub use gc::{DEFAULT_STALE_THRESHOLD, GarbageCollector, GcReport};
pub use heartbeat::{DEFAULT_HEARTBEAT_PREFIX, HeartbeatLog, HeartbeatRecord};
pub use kv::{JsonFileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use memory::{MemoryBackend, MemoryStorage};
pub use storage::{PrivateAppStorage, StorageRoot};
