//! Simulation sessions: importing solver output and stepping through periods.

use std::path::Path;

use hn_core::buffers::Column;
use hn_results::{EpsResultsReader, SimulationArtifacts, TimestepResults, persist_artifacts};
use hn_storage::PrivateAppStorage;

use crate::error::{AppError, AppResult};

/// `HH:MM` of a reporting period counted from the reporting start.
pub fn format_timestep_time(index: usize, step_seconds: i32) -> String {
    let total = index as i64 * i64::from(step_seconds);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    format!("{:02}:{:02}", hours, minutes)
}

fn read_file(path: &Path) -> AppResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read a raw little-endian `f32` side file.
pub fn read_f32_file(path: &Path) -> AppResult<Vec<f32>> {
    let bytes = read_file(path)?;
    let column = Column::<f32>::new("side file", &bytes).map_err(|e| {
        AppError::InvalidInput(format!("{}: {}", path.display(), e))
    })?;
    Ok(column.iter().collect())
}

/// Copy a solver's output files into `storage`, returning the metadata bytes.
pub fn import_results(
    storage: &dyn PrivateAppStorage,
    results_out: &Path,
    tank_volumes: Option<&Path>,
    pump_status: Option<&Path>,
) -> AppResult<Vec<u8>> {
    let artifacts = SimulationArtifacts {
        results_out: read_file(results_out)?,
        tank_volumes: tank_volumes.map(read_f32_file).transpose()?,
        pump_status: pump_status.map(read_f32_file).transpose()?,
    };
    Ok(persist_artifacts(storage, &artifacts)?)
}

/// A loaded simulation with a current reporting period.
pub struct SimulationSession<'a> {
    reader: EpsResultsReader<'a>,
    current: usize,
}

impl<'a> SimulationSession<'a> {
    pub fn open(storage: &'a dyn PrivateAppStorage, metadata: Option<&[u8]>) -> AppResult<Self> {
        let reader = EpsResultsReader::open(storage, metadata, None)?;
        Ok(Self { reader, current: 0 })
    }

    pub fn reader(&self) -> &EpsResultsReader<'a> {
        &self.reader
    }

    pub fn timestep_count(&self) -> usize {
        self.reader.timestep_count()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn can_go_previous(&self) -> bool {
        self.current > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.current + 1 < self.timestep_count()
    }

    /// Move to `index` and load it. The current index is unchanged on error.
    pub fn go_to(&mut self, index: usize) -> AppResult<TimestepResults> {
        let results = self.reader.results_for_timestep(index)?;
        self.current = index;
        Ok(results)
    }

    pub fn current(&self) -> AppResult<TimestepResults> {
        Ok(self.reader.results_for_timestep(self.current)?)
    }

    /// `None` when already at the last period.
    pub fn next(&mut self) -> AppResult<Option<TimestepResults>> {
        if !self.can_go_next() {
            return Ok(None);
        }
        self.go_to(self.current + 1).map(Some)
    }

    /// `None` when already at the first period.
    pub fn previous(&mut self) -> AppResult<Option<TimestepResults>> {
        if !self.can_go_previous() {
            return Ok(None);
        }
        self.go_to(self.current - 1).map(Some)
    }

    /// Labels for a timestep picker, one per period.
    pub fn timestep_labels(&self) -> Vec<String> {
        let step = self.reader.metadata().reporting_step;
        (0..self.timestep_count())
            .map(|i| format_timestep_time(i, step))
            .collect()
    }
}
