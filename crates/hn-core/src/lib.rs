//! hn-core: stable foundation for hydronet.
//!
//! Contains:
//! - ids (asset identifiers assigned by the live model)
//! - buffers (flat little-endian columns, buffer strategy, snapshot digests)
//! - timing (span timers that report through `tracing`)
//! - error (shared error types)

pub mod buffers;
pub mod error;
pub mod ids;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use buffers::{BinaryData, BufferType, SnapshotDigest};
pub use error::{CoreError, CoreResult};
pub use ids::AssetId;
