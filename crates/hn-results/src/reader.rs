//! Random-access reader over a persisted results file.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use hn_core::buffers::{Column, read_le};
use hn_core::timing::Timer;
use hn_storage::PrivateAppStorage;

use crate::artifacts::{PUMP_STATUS_KEY, RESULTS_OUT_KEY, TANK_VOLUMES_KEY};
use crate::error::{ResultsError, ResultsResult};
use crate::frame::{PumpStatusFrame, SharedSections, TimestepResults};
use crate::ids::SimulationIds;
use crate::layout::{FLOAT_SIZE, PUMP_ENERGY_FLOATS, ResultsLayout};
use crate::metadata::{EPILOG_SIZE, METADATA_SIZE, PROLOG_SIZE, SimulationMetadata};
use crate::records::ResultsAssetKind;

const TIMESTEP_BUDGET: Duration = Duration::from_millis(100);

/// Serves any reporting period of `results.out` by reading just its block.
///
/// Metadata, ids, link types, link lengths and pump positions are read once in
/// [`EpsResultsReader::open`]; every later call touches only the requested
/// period's bytes.
pub struct EpsResultsReader<'a> {
    storage: &'a dyn PrivateAppStorage,
    metadata: SimulationMetadata,
    layout: ResultsLayout,
    shared: SharedSections,
    pump_positions: Arc<HashMap<usize, usize>>,
}

impl<'a> EpsResultsReader<'a> {
    /// Open the results of `storage`.
    ///
    /// `metadata` is `prolog ++ epilog` as returned by
    /// [`persist_artifacts`](crate::persist_artifacts); when absent it is read
    /// from the stored file. `ids` likewise skips reading the id sections.
    pub fn open(
        storage: &'a dyn PrivateAppStorage,
        metadata: Option<&[u8]>,
        ids: Option<SimulationIds>,
    ) -> ResultsResult<Self> {
        let metadata = match metadata {
            Some(bytes) => SimulationMetadata::from_bytes(bytes)?,
            None => SimulationMetadata::from_bytes(&read_stored_metadata(storage)?)?,
        };
        let layout = ResultsLayout::new(&metadata);

        let ids = match ids {
            Some(ids) => ids,
            None => {
                let nodes = read_exact(
                    storage,
                    RESULTS_OUT_KEY,
                    layout.node_ids_offset,
                    layout.node_ids_len(),
                )?;
                let links = read_exact(
                    storage,
                    RESULTS_OUT_KEY,
                    layout.link_ids_offset,
                    layout.link_ids_len(),
                )?;
                SimulationIds::from_sections(&nodes, &links)
            }
        };

        let lengths = read_exact(
            storage,
            RESULTS_OUT_KEY,
            layout.link_lengths_offset,
            layout.link_lengths_len(),
        )?;
        let link_lengths: Arc<[f32]> = Column::<f32>::new("link lengths", &lengths)?
            .iter()
            .collect();

        let types = read_exact(
            storage,
            RESULTS_OUT_KEY,
            layout.link_types_offset(),
            layout.link_types_len(),
        )?;
        let link_kinds: Arc<[ResultsAssetKind]> = Column::<i32>::new("link types", &types)?
            .iter()
            .map(ResultsAssetKind::from_link_code)
            .collect();

        let pump_positions = read_pump_positions(storage, &layout, metadata.pump_count)?;

        tracing::debug!(
            app_id = storage.app_id(),
            nodes = metadata.node_count,
            links = metadata.link_count,
            periods = metadata.reporting_periods,
            "results reader opened"
        );

        Ok(Self {
            storage,
            metadata,
            layout,
            shared: SharedSections {
                ids: Arc::new(ids),
                link_lengths,
                link_kinds,
            },
            pump_positions: Arc::new(pump_positions),
        })
    }

    pub fn timestep_count(&self) -> usize {
        self.metadata.reporting_periods
    }

    pub fn metadata(&self) -> &SimulationMetadata {
        &self.metadata
    }

    pub fn layout(&self) -> &ResultsLayout {
        &self.layout
    }

    pub fn simulation_ids(&self) -> &SimulationIds {
        &self.shared.ids
    }

    /// Results of reporting period `index`, in any order.
    pub fn results_for_timestep(&self, index: usize) -> ResultsResult<TimestepResults> {
        let count = self.timestep_count();
        if index >= count {
            return Err(ResultsError::TimestepOutOfRange { index, count });
        }
        let timer = Timer::with_budget("results timestep", TIMESTEP_BUDGET);

        let block = read_exact(
            self.storage,
            RESULTS_OUT_KEY,
            self.layout.timestep_offset(index),
            self.layout.block_size,
        )?;

        let tank_volumes = if self.metadata.res_and_tank_count > 0 {
            let (offset, length) = self.layout.tank_volumes_range(index);
            self.read_side_file(TANK_VOLUMES_KEY, offset, length)?
        } else {
            None
        };

        let pump_status = if self.metadata.pump_count > 0 {
            let (offset, length) = self.layout.pump_status_range(index);
            self.read_side_file(PUMP_STATUS_KEY, offset, length)?
                .map(|statuses| PumpStatusFrame {
                    position_by_link: Arc::clone(&self.pump_positions),
                    statuses,
                })
        } else {
            None
        };

        timer.stop();
        Ok(TimestepResults::new(
            index,
            block,
            self.metadata,
            &self.shared,
            tank_volumes,
            pump_status,
        ))
    }

    /// Side files are optional; a short slice of an existing one is an error.
    fn read_side_file(
        &self,
        key: &'static str,
        offset: u64,
        length: u64,
    ) -> ResultsResult<Option<Vec<f32>>> {
        if self.storage.size(key).is_none() {
            return Ok(None);
        }
        let bytes = read_exact(self.storage, key, offset, length)?;
        let values = Column::<f32>::new(key, &bytes)?.iter().collect();
        Ok(Some(values))
    }
}

fn read_exact(
    storage: &dyn PrivateAppStorage,
    key: &'static str,
    offset: u64,
    length: u64,
) -> ResultsResult<Vec<u8>> {
    match storage.read_slice(key, offset, length) {
        Some(bytes) if bytes.len() as u64 == length => Ok(bytes),
        _ => Err(ResultsError::SliceUnavailable {
            key,
            offset,
            length,
        }),
    }
}

fn read_stored_metadata(storage: &dyn PrivateAppStorage) -> ResultsResult<Vec<u8>> {
    let size = storage
        .size(RESULTS_OUT_KEY)
        .ok_or(ResultsError::SliceUnavailable {
            key: RESULTS_OUT_KEY,
            offset: 0,
            length: PROLOG_SIZE as u64,
        })?;
    if size < METADATA_SIZE as u64 {
        return Err(ResultsError::InvalidMetadata {
            reason: format!("results file of {} bytes is shorter than prolog+epilog", size),
        });
    }
    let mut metadata = read_exact(storage, RESULTS_OUT_KEY, 0, PROLOG_SIZE as u64)?;
    let epilog_offset = size - EPILOG_SIZE as u64;
    metadata.extend(read_exact(
        storage,
        RESULTS_OUT_KEY,
        epilog_offset,
        EPILOG_SIZE as u64,
    )?);
    Ok(metadata)
}

/// Link index -> position in the pump status side file.
fn read_pump_positions(
    storage: &dyn PrivateAppStorage,
    layout: &ResultsLayout,
    pump_count: usize,
) -> ResultsResult<HashMap<usize, usize>> {
    if pump_count == 0 {
        return Ok(HashMap::new());
    }
    let energy = read_exact(
        storage,
        RESULTS_OUT_KEY,
        layout.pump_energy_offset,
        layout.pump_energy_len(),
    )?;
    let stride = (PUMP_ENERGY_FLOATS * FLOAT_SIZE) as usize;
    let mut positions = HashMap::with_capacity(pump_count);
    for position in 0..pump_count {
        let one_based = read_le::<i32>("pump energy", &energy, position * stride)?;
        match usize::try_from(one_based).ok().and_then(|i| i.checked_sub(1)) {
            Some(link_index) => {
                positions.insert(link_index, position);
            }
            None => {
                return Err(ResultsError::InvalidMetadata {
                    reason: format!("pump {} has link index {}", position, one_based),
                });
            }
        }
    }
    Ok(positions)
}
