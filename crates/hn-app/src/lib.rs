//! Shared application service layer for hydronet.
//!
//! Front-ends go through this crate for configuration, network files, network
//! review, simulation sessions and the per-session storage namespace.

pub mod config;
pub mod error;
pub mod instance;
pub mod network;
pub mod network_review;
pub mod simulation;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use instance::{AppInstance, sweep_stale_sessions};
pub use network::{
    LinkDef, LinkKind, NetworkDef, NodeDef, NodeKind, build_model, load_network, save_network,
};
pub use network_review::{
    OrphanAsset, SubnetworkSummary, build_orphan_assets, build_subnetwork_summaries,
    review_orphans, review_subnetworks,
};
pub use simulation::{SimulationSession, format_timestep_time, import_results, read_f32_file};
