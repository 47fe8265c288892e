//! Columnar snapshot codecs.
//!
//! A snapshot is two groups of flat little-endian columns:
//! - asset index: `node_ids`, `node_types`, `link_ids`, `link_types`
//! - topology: `link_endpoints`, `node_link_offsets`, `node_links` (CSR)
//!
//! Both sides use the same dense indices, assigned by the asset index encoder.
//! Topology buffers carry the SHA-256 digest of the asset index they were
//! encoded against, and the topology view refuses any other index.

mod asset_index;
mod topology;

pub use asset_index::{AssetIndexBuffers, AssetIndexEncoder, AssetIndexView, EncodedAssetIndex};
pub use topology::{TopologyBuffers, TopologyEncoder, TopologyView};

use hn_core::{BufferType, SnapshotDigest};

use crate::error::{GraphError, GraphResult};
use crate::indexing::IdMapper;
use crate::queries::{AssetIndexQueries, TopologyQueries};

/// Dense index mapping shared by the encoder output and the decoded view.
pub trait DenseAssetIndex {
    fn node_mapper(&self) -> &IdMapper;
    fn link_mapper(&self) -> &IdMapper;
    fn digest(&self) -> SnapshotDigest;

    fn node_idx(&self, id: hn_core::AssetId) -> GraphResult<u32> {
        self.node_mapper().idx(id)
    }

    fn link_idx(&self, id: hn_core::AssetId) -> GraphResult<u32> {
        self.link_mapper().idx(id)
    }
}

/// Both buffer groups of one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedNetwork {
    pub asset_index: AssetIndexBuffers,
    pub topology: TopologyBuffers,
}

impl EncodedNetwork {
    /// Total payload bytes across all columns.
    pub fn byte_len(&self) -> usize {
        self.asset_index.byte_len() + self.topology.byte_len()
    }

    pub fn buffer_type(&self) -> BufferType {
        self.asset_index.node_ids.buffer_type()
    }
}

/// Encode the asset index, then the topology against it.
pub fn encode_network(
    topology: &impl TopologyQueries,
    assets: &impl AssetIndexQueries,
    buffer_type: BufferType,
) -> GraphResult<EncodedNetwork> {
    let encoded_index = AssetIndexEncoder::new(assets, buffer_type).encode()?;
    let topology = TopologyEncoder::new(topology, &encoded_index, buffer_type).encode()?;
    Ok(EncodedNetwork {
        asset_index: encoded_index.into_buffers(),
        topology,
    })
}

/// Decode both views and hand them to `f`.
pub fn with_views<R>(
    network: EncodedNetwork,
    f: impl FnOnce(&TopologyView<'_>, &AssetIndexView) -> R,
) -> GraphResult<R> {
    let assets = AssetIndexView::new(network.asset_index)?;
    let topology = TopologyView::new(network.topology, &assets)?;
    Ok(f(&topology, &assets))
}

pub(crate) fn to_u32(what: &'static str, value: usize) -> GraphResult<u32> {
    u32::try_from(value).map_err(|_| GraphError::MalformedBuffer {
        what,
        detail: format!("{} does not fit in u32", value),
    })
}
