//! Topology columns: link endpoints plus node -> links adjacency in CSR form.

use std::ops::Range;

use hn_core::buffers::{Column, ColumnBuilder, ColumnElem};
use hn_core::{AssetId, BinaryData, BufferType, SnapshotDigest};

use super::{DenseAssetIndex, to_u32};
use crate::codec::asset_index::AssetIndexView;
use crate::error::{GraphError, GraphResult};
use crate::queries::{AssetIndexQueries, TopologyQueries};

/// Raw topology columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyBuffers {
    /// `[start, end]` dense node indices per link, u32 x 2L.
    pub link_endpoints: BinaryData,
    /// u32 x (N + 1); links of node `i` are `node_links[offsets[i]..offsets[i + 1]]`.
    pub node_link_offsets: BinaryData,
    /// Dense link indices, u32 per incidence.
    pub node_links: BinaryData,
    /// Digest of the asset index these indices refer to.
    pub asset_index_digest: SnapshotDigest,
}

impl TopologyBuffers {
    pub fn byte_len(&self) -> usize {
        self.link_endpoints.len() + self.node_link_offsets.len() + self.node_links.len()
    }
}

/// Encodes connectivity using the dense indices of an already encoded asset index.
pub struct TopologyEncoder<'a, T, I> {
    topology: &'a T,
    index: &'a I,
    buffer_type: BufferType,
}

impl<'a, T: TopologyQueries, I: DenseAssetIndex> TopologyEncoder<'a, T, I> {
    pub fn new(topology: &'a T, index: &'a I, buffer_type: BufferType) -> Self {
        Self {
            topology,
            index,
            buffer_type,
        }
    }

    pub fn encode(self) -> GraphResult<TopologyBuffers> {
        let nodes = self.index.node_mapper();
        let links = self.index.link_mapper();

        let mut endpoints = ColumnBuilder::<u32>::new("link_endpoints", links.len() * 2);
        for &link in links.ids() {
            let [start, end] = self
                .topology
                .link_nodes(link)
                .ok_or(GraphError::MissingEndpoints { link })?;
            for node in [start, end] {
                let idx = nodes
                    .try_idx(node)
                    .ok_or(GraphError::DanglingEndpoint { link, node })?;
                endpoints.push(idx)?;
            }
        }

        // Degrees first so the flat column can be sized exactly
        let total: usize = nodes.ids().iter().map(|&n| self.topology.degree(n)).sum();
        let mut offsets = ColumnBuilder::<u32>::new("node_link_offsets", nodes.len() + 1);
        let mut flat = ColumnBuilder::<u32>::new("node_links", total);

        offsets.push(0)?;
        for &node in nodes.ids() {
            for link in self.topology.node_links(node) {
                let idx = links
                    .try_idx(link)
                    .ok_or(GraphError::UnknownIncidentLink { node, link })?;
                flat.push(idx)?;
            }
            offsets.push(to_u32("node_link_offsets", flat.len())?)?;
        }

        tracing::trace!(
            nodes = nodes.len(),
            links = links.len(),
            incidences = total,
            "topology encoded"
        );
        Ok(TopologyBuffers {
            link_endpoints: endpoints.finish(self.buffer_type)?,
            node_link_offsets: offsets.finish(self.buffer_type)?,
            node_links: flat.finish(self.buffer_type)?,
            asset_index_digest: self.index.digest(),
        })
    }
}

/// Read-only connectivity queries over topology columns.
///
/// Bound to the asset index view it was encoded against; construction checks
/// the digest and every index so queries never go out of range.
#[derive(Debug, Clone)]
pub struct TopologyView<'a> {
    buffers: TopologyBuffers,
    index: &'a AssetIndexView,
}

impl<'a> TopologyView<'a> {
    pub fn new(buffers: TopologyBuffers, index: &'a AssetIndexView) -> GraphResult<Self> {
        if buffers.asset_index_digest != index.digest() {
            return Err(GraphError::SnapshotMismatch);
        }
        let node_count = index.node_count();
        let link_count = index.link_count();

        let endpoints = Column::<u32>::new("link_endpoints", &buffers.link_endpoints)?;
        if endpoints.len() != link_count * 2 {
            return Err(malformed(
                "link_endpoints",
                format!("{} entries for {} links", endpoints.len(), link_count),
            ));
        }
        if let Some(bad) = endpoints.iter().find(|&n| n as usize >= node_count) {
            return Err(malformed(
                "link_endpoints",
                format!("node index {} out of range ({} nodes)", bad, node_count),
            ));
        }

        let offsets = Column::<u32>::new("node_link_offsets", &buffers.node_link_offsets)?;
        let flat = Column::<u32>::new("node_links", &buffers.node_links)?;
        if offsets.len() != node_count + 1 {
            return Err(malformed(
                "node_link_offsets",
                format!("{} entries for {} nodes", offsets.len(), node_count),
            ));
        }
        if offsets.get(0) != Some(0) {
            return Err(malformed("node_link_offsets", "first offset is not 0".into()));
        }
        let mut prev = 0_u32;
        for offset in offsets.iter() {
            if offset < prev {
                return Err(malformed(
                    "node_link_offsets",
                    format!("offset {} follows {}", offset, prev),
                ));
            }
            prev = offset;
        }
        if prev as usize != flat.len() {
            return Err(malformed(
                "node_link_offsets",
                format!("last offset {} but {} incidences", prev, flat.len()),
            ));
        }
        if let Some(bad) = flat.iter().find(|&l| l as usize >= link_count) {
            return Err(malformed(
                "node_links",
                format!("link index {} out of range ({} links)", bad, link_count),
            ));
        }

        Ok(Self { buffers, index })
    }

    pub fn buffers(&self) -> &TopologyBuffers {
        &self.buffers
    }

    pub fn into_buffers(self) -> TopologyBuffers {
        self.buffers
    }

    /// Byte range of a node's incidences within `node_links`.
    fn incidence_range(&self, node: AssetId) -> Range<usize> {
        let Some(idx) = self.index.node_mapper().try_idx(node) else {
            return 0..0;
        };
        let offsets = &self.buffers.node_link_offsets;
        let at = |i: usize| {
            offsets
                .get(i * u32::SIZE..(i + 1) * u32::SIZE)
                .map_or(0, u32::take) as usize
        };
        let idx = idx as usize;
        at(idx) * u32::SIZE..at(idx + 1) * u32::SIZE
    }
}

fn malformed(what: &'static str, detail: String) -> GraphError {
    GraphError::MalformedBuffer { what, detail }
}

impl TopologyQueries for TopologyView<'_> {
    fn has_node(&self, id: AssetId) -> bool {
        self.index.has_node(id)
    }

    fn has_link(&self, id: AssetId) -> bool {
        self.index.has_link(id)
    }

    fn link_nodes(&self, link: AssetId) -> Option<[AssetId; 2]> {
        let idx = self.index.link_mapper().try_idx(link)? as usize;
        let bytes = self
            .buffers
            .link_endpoints
            .get(idx * 2 * u32::SIZE..(idx + 1) * 2 * u32::SIZE)?;
        let node_ids = self.index.node_mapper().ids();
        let start = node_ids.get(u32::take(&bytes[..u32::SIZE]) as usize)?;
        let end = node_ids.get(u32::take(&bytes[u32::SIZE..]) as usize)?;
        Some([*start, *end])
    }

    fn node_links(&self, node: AssetId) -> impl Iterator<Item = AssetId> + '_ {
        let range = self.incidence_range(node);
        let link_ids = self.index.link_mapper().ids();
        self.buffers.node_links[range]
            .chunks_exact(u32::SIZE)
            .filter_map(move |chunk| link_ids.get(u32::take(chunk) as usize).copied())
    }

    fn degree(&self, node: AssetId) -> usize {
        self.incidence_range(node).len() / u32::SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ModelBuilder;
    use crate::codec::asset_index::AssetIndexEncoder;
    use crate::codec::encode_network;
    use crate::model::HydraulicModel;

    fn id(raw: u32) -> AssetId {
        AssetId::new(raw)
    }

    /// R1 -PU1-> J1 -P1-> J2 -V1-> T1, plus an isolated junction J3.
    fn sample_model() -> HydraulicModel {
        let mut builder = ModelBuilder::new();
        builder
            .reservoir(1, "R1")
            .junction(2, "J1")
            .junction(3, "J2")
            .tank(4, "T1")
            .junction(5, "J3")
            .pump(10, "PU1", 1, 2)
            .pipe(11, "P1", 2, 3)
            .valve(12, "V1", 3, 4);
        builder.build().unwrap()
    }

    #[test]
    fn csr_layout_matches_adjacency() {
        let model = sample_model();
        let encoded =
            encode_network(model.topology(), model.asset_index(), BufferType::Array).unwrap();

        let offsets: Vec<u32> = Column::<u32>::new("o", &encoded.topology.node_link_offsets)
            .unwrap()
            .iter()
            .collect();
        assert_eq!(offsets, vec![0, 1, 3, 5, 6, 6]);

        let endpoints: Vec<u32> = Column::<u32>::new("e", &encoded.topology.link_endpoints)
            .unwrap()
            .iter()
            .collect();
        assert_eq!(endpoints, vec![0, 1, 1, 2, 2, 3]);
    }

    #[test]
    fn view_answers_like_the_live_topology() {
        let model = sample_model();
        let live = model.topology();
        let encoded = encode_network(live, model.asset_index(), BufferType::Shared).unwrap();
        let assets = AssetIndexView::new(encoded.asset_index).unwrap();
        let view = TopologyView::new(encoded.topology, &assets).unwrap();

        for raw in 1..=5 {
            let node = id(raw);
            assert!(view.has_node(node));
            assert_eq!(view.degree(node), live.degree(node));
            assert_eq!(
                view.node_links(node).collect::<Vec<_>>(),
                live.node_links(node).collect::<Vec<_>>()
            );
        }
        for raw in 10..=12 {
            assert_eq!(view.link_nodes(id(raw)), live.link_nodes(id(raw)));
        }
        assert_eq!(view.link_nodes(id(99)), None);
        assert_eq!(view.degree(id(99)), 0);
        assert_eq!(view.node_links(id(99)).count(), 0);
    }

    #[test]
    fn view_rejects_topology_from_another_snapshot() {
        let model = sample_model();
        let encoded =
            encode_network(model.topology(), model.asset_index(), BufferType::Array).unwrap();

        let mut other = ModelBuilder::new();
        other.junction(1, "J1");
        let other = other.build().unwrap();
        let other_index = AssetIndexEncoder::new(other.asset_index(), BufferType::Array)
            .encode()
            .unwrap();
        let other_view = AssetIndexView::new(other_index.into_buffers()).unwrap();

        assert_eq!(
            TopologyView::new(encoded.topology, &other_view).unwrap_err(),
            GraphError::SnapshotMismatch
        );
    }

    #[test]
    fn view_rejects_out_of_range_indices() {
        let model = sample_model();
        let encoded =
            encode_network(model.topology(), model.asset_index(), BufferType::Array).unwrap();
        let assets = AssetIndexView::new(encoded.asset_index).unwrap();

        let mut bad = encoded.topology.clone();
        let mut raw = bad.node_links.clone().into_vec();
        raw[..4].copy_from_slice(&77_u32.to_le_bytes());
        bad.node_links = BinaryData::from_vec(raw, BufferType::Array);
        assert!(matches!(
            TopologyView::new(bad, &assets).unwrap_err(),
            GraphError::MalformedBuffer {
                what: "node_links",
                ..
            }
        ));

        let mut short = encoded.topology;
        short.node_link_offsets = BinaryData::from_vec(vec![0; 8], BufferType::Array);
        assert!(matches!(
            TopologyView::new(short, &assets).unwrap_err(),
            GraphError::MalformedBuffer {
                what: "node_link_offsets",
                ..
            }
        ));
    }

    /// Index lists a link the topology never heard of.
    #[test]
    fn encoder_reports_missing_endpoints() {
        let mut index = crate::model::AssetIndex::new();
        index.add_node(id(1), crate::asset::NodeType::Junction);
        index.add_link(id(2), crate::asset::LinkType::Pipe);
        let encoded_index = AssetIndexEncoder::new(&index, BufferType::Array)
            .encode()
            .unwrap();

        let mut topology = crate::model::Topology::new();
        topology.add_node(id(1));
        let err = TopologyEncoder::new(&topology, &encoded_index, BufferType::Array)
            .encode()
            .unwrap_err();
        assert_eq!(err, GraphError::MissingEndpoints { link: id(2) });

        topology.add_link(id(2), id(1), id(50));
        let err = TopologyEncoder::new(&topology, &encoded_index, BufferType::Array)
            .encode()
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::DanglingEndpoint {
                link: id(2),
                node: id(50)
            }
        );
    }

    #[test]
    fn encoder_reports_unknown_incident_link() {
        let mut index = crate::model::AssetIndex::new();
        index.add_node(id(1), crate::asset::NodeType::Junction);
        let encoded_index = AssetIndexEncoder::new(&index, BufferType::Array)
            .encode()
            .unwrap();

        let mut topology = crate::model::Topology::new();
        topology.add_link(id(9), id(1), id(1));
        let err = TopologyEncoder::new(&topology, &encoded_index, BufferType::Array)
            .encode()
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownIncidentLink {
                node: id(1),
                link: id(9)
            }
        );
    }
}
