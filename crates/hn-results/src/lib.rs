//! hn-results: random-access reader for time-stepped simulation results.
//!
//! The solver writes a binary results file (`results.out`) plus optional side
//! files into private app storage. The reader pulls metadata once, then serves
//! any reporting period by reading exactly that period's byte block.

pub mod artifacts;
pub mod error;
pub mod frame;
pub mod ids;
pub mod layout;
pub mod metadata;
pub mod reader;
pub mod records;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use artifacts::{
    PUMP_STATUS_KEY, RESULTS_OUT_KEY, SimulationArtifacts, TANK_VOLUMES_KEY, extract_metadata,
    persist_artifacts,
};
pub use error::{ResultsError, ResultsResult};
pub use frame::{LinkValues, NodeValues, TimestepResults};
pub use ids::SimulationIds;
pub use layout::ResultsLayout;
pub use metadata::{EPILOG_SIZE, METADATA_SIZE, PROLOG_SIZE, SimulationMetadata};
pub use reader::EpsResultsReader;
pub use records::{
    JunctionResults, PipeResults, PipeStatus, PumpResults, PumpStatus, PumpWarning,
    ResultsAssetKind, ResultsSource, TankResults, ValveResults, ValveStatus, ValveWarning,
};
