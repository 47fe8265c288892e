//! Analysis contract understood by the dispatcher.

use hn_graph::{AssetIndexQueries, TopologyQueries};

use crate::cancel::Interrupt;

/// A read-only computation over one network snapshot.
///
/// Implementations must not care whether they receive the live model or
/// decoded views; the dispatcher picks one or the other at run time.
/// Long-running analyses should poll `interrupt` and return early once it is
/// raised; the dispatcher discards the output of an interrupted run.
pub trait NetworkAnalysis: Send + 'static {
    type Output: Send + 'static;

    /// Short name used for worker thread names and logs.
    const NAME: &'static str;

    fn run<T, A>(&self, topology: &T, assets: &A, interrupt: &Interrupt) -> Self::Output
    where
        T: TopologyQueries,
        A: AssetIndexQueries;
}
