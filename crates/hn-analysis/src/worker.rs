//! Single-use analysis worker thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded};
use hn_graph::{EncodedNetwork, GraphResult, with_views};

use crate::analysis::NetworkAnalysis;
use crate::cancel::Interrupt;
use crate::error::{AnalysisError, AnalysisResult};

/// Owns one worker thread for one analysis run.
///
/// Dropping the worker terminates it: the request channel closes and the
/// termination flag is raised. The analysis sees the flag through its
/// `Interrupt` and no response is delivered. The thread is joined if it
/// already finished or detached otherwise.
pub(crate) struct AnalysisWorker<O> {
    requests: Option<Sender<EncodedNetwork>>,
    responses: Receiver<GraphResult<O>>,
    terminated: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl<O: Send + 'static> AnalysisWorker<O> {
    pub(crate) fn spawn<N>(analysis: N, interrupt: Interrupt) -> AnalysisResult<Self>
    where
        N: NetworkAnalysis<Output = O>,
    {
        let (request_tx, request_rx) = bounded::<EncodedNetwork>(1);
        let (response_tx, response_rx) = bounded::<GraphResult<O>>(1);
        let terminated = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&terminated);
        let interrupt = interrupt.with_flag(Arc::clone(&terminated));

        let handle = thread::Builder::new()
            .name(format!("hn-analysis-{}", N::NAME))
            .spawn(move || {
                let Ok(network) = request_rx.recv() else {
                    return;
                };
                if interrupt.is_raised() {
                    return;
                }
                let output = with_views(network, |topology, assets| {
                    analysis.run(topology, assets, &interrupt)
                });
                if !flag.load(Ordering::SeqCst) {
                    let _ = response_tx.send(output);
                }
            })
            .map_err(|e| AnalysisError::WorkerSpawn {
                reason: e.to_string(),
            })?;

        tracing::debug!(analysis = N::NAME, "analysis worker spawned");
        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            terminated,
            handle: Some(handle),
        })
    }

    /// Hand the snapshot over. Buffers move; shared buffers move their handle.
    pub(crate) fn post(&self, network: EncodedNetwork) -> AnalysisResult<()> {
        let requests = self
            .requests
            .as_ref()
            .ok_or_else(|| AnalysisError::WorkerFailed {
                reason: "worker already terminated".to_string(),
            })?;
        requests
            .send(network)
            .map_err(|_| AnalysisError::WorkerFailed {
                reason: "worker exited before receiving the snapshot".to_string(),
            })
    }

    pub(crate) fn responses(&self) -> &Receiver<GraphResult<O>> {
        &self.responses
    }
}

impl<O> Drop for AnalysisWorker<O> {
    fn drop(&mut self) {
        self.terminated.store(true, Ordering::SeqCst);
        self.requests = None;
        if let Some(handle) = self.handle.take() {
            if handle.is_finished() {
                if handle.join().is_err() {
                    tracing::warn!("analysis worker panicked");
                }
            } else {
                tracing::debug!("analysis worker detached while still running");
            }
        }
    }
}
