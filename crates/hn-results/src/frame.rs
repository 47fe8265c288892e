//! One reporting period's results.

use std::collections::HashMap;
use std::sync::Arc;

use hn_core::buffers::read_le;
use serde::Serialize;

use crate::ids::SimulationIds;
use crate::layout::{FLOAT_SIZE, NODE_RESULT_FLOATS};
use crate::metadata::SimulationMetadata;
use crate::records::{
    JunctionResults, PipeResults, PipeStatus, PumpResults, PumpStatus, PumpWarning,
    ResultsAssetKind, ResultsSource, TankResults, ValveResults, ValveStatus, ValveWarning,
};

/// Raw node values of one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeValues {
    pub demand: f32,
    pub head: f32,
    pub pressure: f32,
    pub quality: f32,
}

/// Raw link values of one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkValues {
    pub flow: f32,
    pub velocity: f32,
    pub headloss: f32,
    pub avg_quality: f32,
    pub status: f32,
    pub setting: f32,
    pub reaction_rate: f32,
    pub friction: f32,
}

/// Pump statuses from the side file, addressed by link index.
#[derive(Debug, Clone)]
pub(crate) struct PumpStatusFrame {
    pub(crate) position_by_link: Arc<HashMap<usize, usize>>,
    pub(crate) statuses: Vec<f32>,
}

/// Results of one reporting period, decoded lazily from its byte block.
#[derive(Debug, Clone)]
pub struct TimestepResults {
    index: usize,
    block: Vec<u8>,
    metadata: SimulationMetadata,
    ids: Arc<SimulationIds>,
    link_lengths: Arc<[f32]>,
    link_kinds: Arc<[ResultsAssetKind]>,
    tank_volumes: Option<Vec<f32>>,
    pump_status: Option<PumpStatusFrame>,
}

/// Per-simulation data shared by every period.
#[derive(Debug, Clone)]
pub(crate) struct SharedSections {
    pub(crate) ids: Arc<SimulationIds>,
    pub(crate) link_lengths: Arc<[f32]>,
    pub(crate) link_kinds: Arc<[ResultsAssetKind]>,
}

impl TimestepResults {
    pub(crate) fn new(
        index: usize,
        block: Vec<u8>,
        metadata: SimulationMetadata,
        shared: &SharedSections,
        tank_volumes: Option<Vec<f32>>,
        pump_status: Option<PumpStatusFrame>,
    ) -> Self {
        Self {
            index,
            block,
            metadata,
            ids: Arc::clone(&shared.ids),
            link_lengths: Arc::clone(&shared.link_lengths),
            link_kinds: Arc::clone(&shared.link_kinds),
            tank_volumes,
            pump_status,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Simulation clock of this period, in seconds.
    pub fn time(&self) -> i64 {
        self.metadata.timestep_time(self.index)
    }

    pub fn simulation_ids(&self) -> &SimulationIds {
        &self.ids
    }

    pub fn metadata(&self) -> &SimulationMetadata {
        &self.metadata
    }

    /// Which typed lookup applies to `label`.
    pub fn asset_kind(&self, label: &str) -> Option<ResultsAssetKind> {
        if let Some(index) = self.ids.node_index(label) {
            let first_tank = self
                .metadata
                .node_count
                .saturating_sub(self.metadata.res_and_tank_count);
            return Some(if index >= first_tank {
                ResultsAssetKind::Tank
            } else {
                ResultsAssetKind::Junction
            });
        }
        let index = self.ids.link_index(label)?;
        self.link_kinds.get(index).copied()
    }

    fn float(&self, offset: u64) -> Option<f32> {
        read_le::<f32>("timestep block", &self.block, usize::try_from(offset).ok()?).ok()
    }

    /// The `field`-th array of `count` floats, entry `index`.
    fn field(&self, base: u64, count: usize, field: u64, index: usize) -> Option<f32> {
        self.float(base + (field * count as u64 + index as u64) * FLOAT_SIZE)
    }

    pub fn node_values(&self, index: usize) -> Option<NodeValues> {
        let n = self.metadata.node_count;
        if index >= n {
            return None;
        }
        Some(NodeValues {
            demand: self.field(0, n, 0, index)?,
            head: self.field(0, n, 1, index)?,
            pressure: self.field(0, n, 2, index)?,
            quality: self.field(0, n, 3, index)?,
        })
    }

    pub fn link_values(&self, index: usize) -> Option<LinkValues> {
        let l = self.metadata.link_count;
        if index >= l {
            return None;
        }
        let base = self.metadata.node_count as u64 * NODE_RESULT_FLOATS * FLOAT_SIZE;
        Some(LinkValues {
            flow: self.field(base, l, 0, index)?,
            velocity: self.field(base, l, 1, index)?,
            headloss: self.field(base, l, 2, index)?,
            avg_quality: self.field(base, l, 3, index)?,
            status: self.field(base, l, 4, index)?,
            setting: self.field(base, l, 5, index)?,
            reaction_rate: self.field(base, l, 6, index)?,
            friction: self.field(base, l, 7, index)?,
        })
    }

    fn side_file_pump_status(&self, link_index: usize) -> Option<f32> {
        let frame = self.pump_status.as_ref()?;
        let position = *frame.position_by_link.get(&link_index)?;
        frame.statuses.get(position).copied()
    }

    /// Tanks and reservoirs are the last nodes, in side-file order.
    fn tank_volume(&self, node_index: usize) -> f32 {
        let first = self
            .metadata
            .node_count
            .saturating_sub(self.metadata.res_and_tank_count);
        if node_index < first {
            return 0.0;
        }
        self.tank_volumes
            .as_ref()
            .and_then(|volumes| volumes.get(node_index - first).copied())
            .unwrap_or(0.0)
    }
}

impl ResultsSource for TimestepResults {
    fn junction(&self, label: &str) -> Option<JunctionResults> {
        let values = self.node_values(self.ids.node_index(label)?)?;
        Some(JunctionResults {
            pressure: values.pressure,
            head: values.head,
            demand: values.demand,
        })
    }

    fn tank(&self, label: &str) -> Option<TankResults> {
        let index = self.ids.node_index(label)?;
        let values = self.node_values(index)?;
        Some(TankResults {
            pressure: values.pressure,
            head: values.head,
            level: values.pressure,
            volume: self.tank_volume(index),
        })
    }

    fn pipe(&self, label: &str) -> Option<PipeResults> {
        let index = self.ids.link_index(label)?;
        let values = self.link_values(index)?;
        let length = self.link_lengths.get(index).copied().unwrap_or(0.0);
        Some(PipeResults {
            flow: values.flow,
            velocity: values.velocity,
            headloss: values.headloss * (length / 1000.0),
            unit_headloss: values.headloss,
            status: PipeStatus::from_code(values.status),
        })
    }

    fn valve(&self, label: &str) -> Option<ValveResults> {
        let values = self.link_values(self.ids.link_index(label)?)?;
        Some(ValveResults {
            flow: values.flow,
            velocity: values.velocity,
            headloss: values.headloss,
            status: ValveStatus::from_code(values.status),
            warning: ValveWarning::from_code(values.status),
        })
    }

    fn pump(&self, label: &str) -> Option<PumpResults> {
        let index = self.ids.link_index(label)?;
        let values = self.link_values(index)?;
        let code = self.side_file_pump_status(index).unwrap_or(values.status);
        Some(PumpResults {
            flow: values.flow,
            headloss: values.headloss,
            status: PumpStatus::from_code(code),
            warning: PumpWarning::from_code(code),
        })
    }
}
