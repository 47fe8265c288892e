//! Byte offsets of every section of the results file.

use crate::metadata::{PROLOG_SIZE, SimulationMetadata};

pub const ID_LENGTH: u64 = 32;
pub const FLOAT_SIZE: u64 = 4;
pub const INT_SIZE: u64 = 4;
pub const NODE_RESULT_FLOATS: u64 = 4;
pub const LINK_RESULT_FLOATS: u64 = 8;
pub const PUMP_ENERGY_FLOATS: u64 = 7;
const PEAK_ENERGY_SIZE: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultsLayout {
    pub node_ids_offset: u64,
    pub link_ids_offset: u64,
    pub link_lengths_offset: u64,
    pub pump_energy_offset: u64,
    /// First byte of reporting period 0.
    pub results_base: u64,
    /// Bytes per reporting period.
    pub block_size: u64,
    node_count: u64,
    link_count: u64,
    tank_count: u64,
    pump_count: u64,
}

impl ResultsLayout {
    pub fn new(meta: &SimulationMetadata) -> Self {
        let n = meta.node_count as u64;
        let l = meta.link_count as u64;
        let t = meta.res_and_tank_count as u64;
        let p = meta.pump_count as u64;

        let node_ids_offset = PROLOG_SIZE as u64;
        let link_ids_offset = node_ids_offset + ID_LENGTH * n;
        // start/end/type per link, then tank index + area per tank, then elevations
        let link_lengths_offset =
            link_ids_offset + ID_LENGTH * l + 3 * FLOAT_SIZE * l + 2 * FLOAT_SIZE * t + FLOAT_SIZE * n;
        // lengths then diameters
        let pump_energy_offset = link_lengths_offset + 2 * FLOAT_SIZE * l;
        let results_base =
            pump_energy_offset + PUMP_ENERGY_FLOATS * FLOAT_SIZE * p + PEAK_ENERGY_SIZE;
        let block_size = n * NODE_RESULT_FLOATS * FLOAT_SIZE + l * LINK_RESULT_FLOATS * FLOAT_SIZE;

        Self {
            node_ids_offset,
            link_ids_offset,
            link_lengths_offset,
            pump_energy_offset,
            results_base,
            block_size,
            node_count: n,
            link_count: l,
            tank_count: t,
            pump_count: p,
        }
    }

    pub fn node_ids_len(&self) -> u64 {
        ID_LENGTH * self.node_count
    }

    pub fn link_ids_len(&self) -> u64 {
        ID_LENGTH * self.link_count
    }

    /// Link type codes, after the start and end node indices.
    pub fn link_types_offset(&self) -> u64 {
        self.link_ids_offset + ID_LENGTH * self.link_count + 2 * INT_SIZE * self.link_count
    }

    pub fn link_types_len(&self) -> u64 {
        INT_SIZE * self.link_count
    }

    pub fn link_lengths_len(&self) -> u64 {
        FLOAT_SIZE * self.link_count
    }

    pub fn pump_energy_len(&self) -> u64 {
        PUMP_ENERGY_FLOATS * FLOAT_SIZE * self.pump_count
    }

    /// Offset of a reporting period's block in `results.out`.
    pub fn timestep_offset(&self, index: usize) -> u64 {
        self.results_base + index as u64 * self.block_size
    }

    /// `(offset, length)` of a period's tank volumes in the tank side file.
    pub fn tank_volumes_range(&self, index: usize) -> (u64, u64) {
        let len = self.tank_count * FLOAT_SIZE;
        (index as u64 * len, len)
    }

    /// `(offset, length)` of a period's pump statuses in the pump side file.
    pub fn pump_status_range(&self, index: usize) -> (u64, u64) {
        let len = self.pump_count * FLOAT_SIZE;
        (index as u64 * len, len)
    }
}
