//! Runs analyses inline or on a worker thread.
//!
//! Every run encodes a fresh snapshot on the caller's thread. The analysis then
//! sees decoded views, never the live model, whichever path is taken.

use crossbeam_channel::{never, select};
use hn_core::BufferType;
use hn_core::timing::Timer;
use hn_graph::{AssetIndexQueries, EncodedNetwork, TopologyQueries, encode_network, with_views};
use serde::{Deserialize, Serialize};

use crate::analysis::NetworkAnalysis;
use crate::cancel::{CancellationToken, Interrupt};
use crate::error::{AnalysisError, AnalysisResult};
use crate::host::HostCapabilities;
use crate::worker::AnalysisWorker;

/// Requested execution mode. The host may still force inline execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Worker,
    Inline,
}

/// Path actually taken for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPath {
    Inline,
    Worker,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    pub buffer_type: BufferType,
    pub mode: ExecutionMode,
}

impl DispatchOptions {
    pub fn inline() -> Self {
        Self {
            buffer_type: BufferType::Array,
            mode: ExecutionMode::Inline,
        }
    }

    pub fn with_buffer_type(mut self, buffer_type: BufferType) -> Self {
        self.buffer_type = buffer_type;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatcher {
    host: HostCapabilities,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::detect()
    }
}

impl Dispatcher {
    pub fn new(host: HostCapabilities) -> Self {
        Self { host }
    }

    pub fn detect() -> Self {
        Self::new(HostCapabilities::detect())
    }

    pub fn host(&self) -> HostCapabilities {
        self.host
    }

    /// Path a run with these options would take on this host.
    pub fn plan(&self, options: &DispatchOptions) -> ExecutionPath {
        if options.mode == ExecutionMode::Inline {
            return ExecutionPath::Inline;
        }
        if !self.host.workers {
            tracing::warn!("worker threads unavailable, running analysis inline");
            return ExecutionPath::Inline;
        }
        if options.buffer_type == BufferType::Shared && !self.host.shared_memory {
            tracing::warn!("shared buffers unavailable, running analysis inline");
            return ExecutionPath::Inline;
        }
        ExecutionPath::Worker
    }

    pub fn run<N, T, A>(
        &self,
        analysis: N,
        topology: &T,
        assets: &A,
        options: &DispatchOptions,
        cancel: Option<&CancellationToken>,
    ) -> AnalysisResult<N::Output>
    where
        N: NetworkAnalysis,
        T: TopologyQueries,
        A: AssetIndexQueries,
    {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            tracing::debug!(analysis = N::NAME, "cancelled before encoding");
            return Err(AnalysisError::Cancelled);
        }

        let timer = Timer::start("encode network");
        let network = encode_network(topology, assets, options.buffer_type)?;
        let elapsed = timer.stop();
        tracing::debug!(
            analysis = N::NAME,
            bytes = network.byte_len(),
            buffer_type = %options.buffer_type,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "snapshot encoded"
        );

        match self.plan(options) {
            ExecutionPath::Inline => run_inline(analysis, network, cancel),
            ExecutionPath::Worker => run_in_worker(analysis, network, cancel),
        }
    }
}

fn run_inline<N: NetworkAnalysis>(
    analysis: N,
    network: EncodedNetwork,
    cancel: Option<&CancellationToken>,
) -> AnalysisResult<N::Output> {
    if cancel.is_some_and(CancellationToken::is_cancelled) {
        return Err(AnalysisError::Cancelled);
    }
    tracing::debug!(analysis = N::NAME, "running inline");
    let interrupt = cancel.map_or_else(Interrupt::never, Interrupt::from_token);
    let output = with_views(network, |topology, assets| {
        analysis.run(topology, assets, &interrupt)
    })?;
    if interrupt.is_raised() {
        return Err(AnalysisError::Cancelled);
    }
    Ok(output)
}

fn run_in_worker<N: NetworkAnalysis>(
    analysis: N,
    network: EncodedNetwork,
    cancel: Option<&CancellationToken>,
) -> AnalysisResult<N::Output> {
    let registration = cancel.map(CancellationToken::on_cancel);
    let interrupt = cancel.map_or_else(Interrupt::never, Interrupt::from_token);
    let worker = AnalysisWorker::spawn(analysis, interrupt)?;
    worker.post(network)?;

    let idle = never::<()>();
    let cancelled = registration.as_ref().map_or(&idle, |r| r.receiver());

    select! {
        recv(worker.responses()) -> response => match response {
            Ok(output) => Ok(output?),
            Err(_) => Err(AnalysisError::WorkerFailed {
                reason: "worker exited without a response".to_string(),
            }),
        },
        recv(cancelled) -> _ => {
            tracing::debug!(analysis = N::NAME, "cancelled while worker was running");
            Err(AnalysisError::Cancelled)
        }
    }
}
