//! Counts and reporting times from the results file's prolog and epilog.

use hn_core::buffers::read_le;
use serde::Serialize;

use crate::error::{ResultsError, ResultsResult};

pub const PROLOG_SIZE: usize = 884;
pub const EPILOG_SIZE: usize = 12;
/// Prolog followed by epilog.
pub const METADATA_SIZE: usize = PROLOG_SIZE + EPILOG_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimulationMetadata {
    pub node_count: usize,
    /// Tanks and reservoirs; they are the last nodes of the node list.
    pub res_and_tank_count: usize,
    pub link_count: usize,
    pub pump_count: usize,
    pub valve_count: usize,
    /// Seconds.
    pub reporting_start: i32,
    /// Seconds.
    pub reporting_step: i32,
    /// Seconds.
    pub duration: i32,
    pub reporting_periods: usize,
}

impl SimulationMetadata {
    /// Parse `prolog ++ epilog`. The input must be exactly `METADATA_SIZE` bytes.
    pub fn from_bytes(bytes: &[u8]) -> ResultsResult<Self> {
        if bytes.len() != METADATA_SIZE {
            return Err(ResultsError::InvalidMetadata {
                reason: format!(
                    "expected {} bytes of prolog+epilog, got {}",
                    METADATA_SIZE,
                    bytes.len()
                ),
            });
        }
        let (prolog, epilog) = bytes.split_at(PROLOG_SIZE);

        Ok(Self {
            node_count: count("node count", read_le::<i32>("prolog", prolog, 8)?)?,
            res_and_tank_count: count("tank count", read_le::<i32>("prolog", prolog, 12)?)?,
            link_count: count("link count", read_le::<i32>("prolog", prolog, 16)?)?,
            pump_count: count("pump count", read_le::<i32>("prolog", prolog, 20)?)?,
            valve_count: count("valve count", read_le::<i32>("prolog", prolog, 24)?)?,
            reporting_start: read_le::<i32>("prolog", prolog, 48)?,
            reporting_step: read_le::<i32>("prolog", prolog, 52)?,
            duration: read_le::<i32>("prolog", prolog, 56)?,
            reporting_periods: count("reporting periods", read_le::<i32>("epilog", epilog, 0)?)?,
        })
    }

    /// Simulation clock of a reporting period, in seconds.
    pub fn timestep_time(&self, index: usize) -> i64 {
        i64::from(self.reporting_start) + index as i64 * i64::from(self.reporting_step)
    }
}

fn count(what: &str, raw: i32) -> ResultsResult<usize> {
    usize::try_from(raw).map_err(|_| ResultsError::InvalidMetadata {
        reason: format!("negative {}: {}", what, raw),
    })
}
