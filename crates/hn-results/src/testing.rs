//! Synthetic results files for tests.
//!
//! Every value is derived from `(period, field, element)` so a test can
//! recompute what a lookup must return.

use crate::artifacts::SimulationArtifacts;
use crate::layout::{ID_LENGTH, PUMP_ENERGY_FLOATS};
use crate::metadata::{EPILOG_SIZE, PROLOG_SIZE};

pub const REPORTING_STEP: i32 = 3600;

/// Shape and fixed inputs of a fake simulation run.
#[derive(Debug, Clone)]
pub struct FakeRun {
    pub nodes: Vec<String>,
    pub links: Vec<String>,
    /// Trailing nodes that are tanks or reservoirs.
    pub tank_count: usize,
    /// Link index of every pump, in pump order.
    pub pump_links: Vec<usize>,
    pub valve_count: usize,
    /// Solver link type codes.
    pub link_types: Vec<i32>,
    pub link_lengths: Vec<f32>,
    /// Status code per link, the same in every period.
    pub link_status: Vec<f32>,
    pub periods: usize,
}

impl FakeRun {
    /// J1 J2 T1 R1 / P1 P2 V1 PU1 over four periods.
    pub fn small() -> Self {
        Self {
            nodes: labels(&["J1", "J2", "T1", "R1"]),
            links: labels(&["P1", "P2", "V1", "PU1"]),
            tank_count: 2,
            pump_links: vec![3],
            valve_count: 1,
            link_types: vec![1, 1, 3, 2],
            link_lengths: vec![500.0, 2000.0, 0.0, 0.0],
            link_status: vec![3.0, 2.0, 6.0, 3.0],
            periods: 4,
        }
    }

    pub fn node_value(period: usize, field: usize, node: usize) -> f32 {
        (period * 1000 + field * 100 + node) as f32
    }

    pub fn link_value(&self, period: usize, field: usize, link: usize) -> f32 {
        if field == 4 {
            return self.link_status[link];
        }
        (100_000 + period * 1000 + field * 100 + link) as f32
    }

    pub fn tank_volume(period: usize, tank: usize) -> f32 {
        (period * 10 + tank) as f32 + 0.5
    }

    /// Side-file pump status: off in odd periods.
    pub fn pump_status(period: usize) -> f32 {
        if period % 2 == 1 { 2.0 } else { 3.0 }
    }

    pub fn results_out(&self) -> Vec<u8> {
        let n = self.nodes.len();
        let l = self.links.len();
        let t = self.tank_count;
        let p = self.pump_links.len();

        let mut out = vec![0_u8; PROLOG_SIZE];
        put_i32(&mut out, 8, n as i32);
        put_i32(&mut out, 12, t as i32);
        put_i32(&mut out, 16, l as i32);
        put_i32(&mut out, 20, p as i32);
        put_i32(&mut out, 24, self.valve_count as i32);
        put_i32(&mut out, 48, 0);
        put_i32(&mut out, 52, REPORTING_STEP);
        put_i32(&mut out, 56, REPORTING_STEP * self.periods.saturating_sub(1) as i32);

        for label in self.nodes.iter().chain(&self.links) {
            let mut raw = label.as_bytes().to_vec();
            raw.resize(ID_LENGTH as usize, 0);
            out.extend(raw);
        }
        out.extend(vec![0_u8; 8 * l]);
        for code in &self.link_types {
            out.extend(code.to_le_bytes());
        }
        out.extend(vec![0_u8; 8 * t + 4 * n]);
        for length in &self.link_lengths {
            out.extend(length.to_le_bytes());
        }
        out.extend(vec![0_u8; 4 * l]);
        for &link in &self.pump_links {
            out.extend((link as i32 + 1).to_le_bytes());
            out.extend(vec![0_u8; 4 * (PUMP_ENERGY_FLOATS as usize - 1)]);
        }
        out.extend([0_u8; 4]);

        for period in 0..self.periods {
            for field in 0..4 {
                for node in 0..n {
                    out.extend(Self::node_value(period, field, node).to_le_bytes());
                }
            }
            for field in 0..8 {
                for link in 0..l {
                    out.extend(self.link_value(period, field, link).to_le_bytes());
                }
            }
        }

        let mut epilog = vec![0_u8; EPILOG_SIZE];
        put_i32(&mut epilog, 0, self.periods as i32);
        out.extend(epilog);
        out
    }

    pub fn artifacts(&self, with_side_files: bool) -> SimulationArtifacts {
        let (tank_volumes, pump_status) = if with_side_files {
            let volumes = (0..self.periods)
                .flat_map(|period| (0..self.tank_count).map(move |k| Self::tank_volume(period, k)))
                .collect();
            let statuses = (0..self.periods)
                .flat_map(|period| self.pump_links.iter().map(move |_| Self::pump_status(period)))
                .collect();
            (Some(volumes), Some(statuses))
        } else {
            (None, None)
        };
        SimulationArtifacts {
            results_out: self.results_out(),
            tank_volumes,
            pump_status,
        }
    }
}

fn labels(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

fn put_i32(bytes: &mut [u8], offset: usize, value: i32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
