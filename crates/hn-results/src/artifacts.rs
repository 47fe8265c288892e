//! Persisting solver output into app storage.

use hn_storage::PrivateAppStorage;

use crate::error::{ResultsError, ResultsResult};
use crate::metadata::{EPILOG_SIZE, METADATA_SIZE, PROLOG_SIZE, SimulationMetadata};

pub const RESULTS_OUT_KEY: &str = "results.out";
pub const TANK_VOLUMES_KEY: &str = "tank-volumes.bin";
pub const PUMP_STATUS_KEY: &str = "pump-status.bin";

/// Everything one simulation run leaves behind.
#[derive(Debug, Clone, Default)]
pub struct SimulationArtifacts {
    pub results_out: Vec<u8>,
    /// Tank/reservoir volumes, period-major.
    pub tank_volumes: Option<Vec<f32>>,
    /// Pump status codes, period-major.
    pub pump_status: Option<Vec<f32>>,
}

/// Copy out `prolog ++ epilog` of a complete results file.
pub fn extract_metadata(results_out: &[u8]) -> ResultsResult<Vec<u8>> {
    if results_out.len() < METADATA_SIZE {
        return Err(ResultsError::InvalidMetadata {
            reason: format!(
                "results file of {} bytes is shorter than prolog+epilog",
                results_out.len()
            ),
        });
    }
    let mut metadata = Vec::with_capacity(METADATA_SIZE);
    metadata.extend_from_slice(&results_out[..PROLOG_SIZE]);
    metadata.extend_from_slice(&results_out[results_out.len() - EPILOG_SIZE..]);
    Ok(metadata)
}

/// Save the results file and side files, returning the metadata bytes.
pub fn persist_artifacts(
    storage: &dyn PrivateAppStorage,
    artifacts: &SimulationArtifacts,
) -> ResultsResult<Vec<u8>> {
    let metadata = extract_metadata(&artifacts.results_out)?;
    let parsed = SimulationMetadata::from_bytes(&metadata)?;

    storage.save(RESULTS_OUT_KEY, &artifacts.results_out)?;
    if let Some(volumes) = artifacts.tank_volumes.as_deref().filter(|v| !v.is_empty()) {
        storage.save(TANK_VOLUMES_KEY, &f32_bytes(volumes))?;
    }
    if let Some(statuses) = artifacts.pump_status.as_deref().filter(|s| !s.is_empty()) {
        storage.save(PUMP_STATUS_KEY, &f32_bytes(statuses))?;
    }

    tracing::info!(
        app_id = storage.app_id(),
        bytes = artifacts.results_out.len(),
        periods = parsed.reporting_periods,
        "simulation artifacts persisted"
    );
    Ok(metadata)
}

pub(crate) fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_metadata_joins_prolog_and_epilog() {
        let mut file = vec![1_u8; PROLOG_SIZE];
        file.extend(vec![0_u8; 100]);
        file.extend(vec![2_u8; EPILOG_SIZE]);

        let metadata = extract_metadata(&file).unwrap();
        assert_eq!(metadata.len(), METADATA_SIZE);
        assert!(metadata[..PROLOG_SIZE].iter().all(|&b| b == 1));
        assert!(metadata[PROLOG_SIZE..].iter().all(|&b| b == 2));
    }

    #[test]
    fn short_file_is_rejected() {
        assert!(matches!(
            extract_metadata(&[0; 10]),
            Err(ResultsError::InvalidMetadata { .. })
        ));
    }

    #[test]
    fn f32_bytes_are_little_endian() {
        assert_eq!(f32_bytes(&[1.0]), 1.0_f32.to_le_bytes().to_vec());
    }
}
