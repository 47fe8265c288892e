//! hn-analysis: graph analyses (orphans, subnetworks) and the dispatcher that runs them.
//!
//! Analyses are written once against the `hn-graph` query traits. The
//! dispatcher encodes a snapshot and runs the analysis either inline or on a
//! single-use worker thread, honouring a cancellation token.

pub mod analysis;
pub mod cancel;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod orphans;
pub mod subnetworks;
mod worker;

pub use analysis::NetworkAnalysis;
pub use cancel::{CancelRegistration, CancellationToken, Interrupt};
pub use dispatch::{DispatchOptions, Dispatcher, ExecutionMode, ExecutionPath};
pub use error::{AnalysisError, AnalysisResult};
pub use host::HostCapabilities;
pub use orphans::{OrphanAssets, OrphanAssetsCheck, find_orphan_assets};
pub use subnetworks::{Subnetwork, SubnetworksCheck, find_subnetworks};
