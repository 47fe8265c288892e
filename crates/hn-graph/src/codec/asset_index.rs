//! Asset index columns: ids and type tags for nodes and links.

use hn_core::buffers::{Column, ColumnBuilder, digest_columns};
use hn_core::{AssetId, BinaryData, BufferType, SnapshotDigest};

use super::DenseAssetIndex;
use crate::asset::{LinkType, NodeType};
use crate::error::{GraphError, GraphResult};
use crate::indexing::IdMapper;
use crate::queries::AssetIndexQueries;

/// Raw asset index columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetIndexBuffers {
    /// u32 per node, indexed by dense node index.
    pub node_ids: BinaryData,
    /// u8 type tag per node.
    pub node_types: BinaryData,
    /// u32 per link, indexed by dense link index.
    pub link_ids: BinaryData,
    /// u8 type tag per link.
    pub link_types: BinaryData,
}

impl AssetIndexBuffers {
    pub fn digest(&self) -> SnapshotDigest {
        digest_columns(&[
            self.node_ids.as_bytes(),
            self.node_types.as_bytes(),
            self.link_ids.as_bytes(),
            self.link_types.as_bytes(),
        ])
    }

    pub fn byte_len(&self) -> usize {
        self.node_ids.len() + self.node_types.len() + self.link_ids.len() + self.link_types.len()
    }
}

/// Encoder output: the buffers plus the mappers used to fill them.
#[derive(Debug, Clone)]
pub struct EncodedAssetIndex {
    buffers: AssetIndexBuffers,
    nodes: IdMapper,
    links: IdMapper,
    digest: SnapshotDigest,
}

impl EncodedAssetIndex {
    pub fn buffers(&self) -> &AssetIndexBuffers {
        &self.buffers
    }

    pub fn into_buffers(self) -> AssetIndexBuffers {
        self.buffers
    }
}

impl DenseAssetIndex for EncodedAssetIndex {
    fn node_mapper(&self) -> &IdMapper {
        &self.nodes
    }

    fn link_mapper(&self) -> &IdMapper {
        &self.links
    }

    fn digest(&self) -> SnapshotDigest {
        self.digest
    }
}

/// Encodes any `AssetIndexQueries` into columns, assigning dense indices in
/// iteration order.
pub struct AssetIndexEncoder<'a, Q> {
    assets: &'a Q,
    buffer_type: BufferType,
}

impl<'a, Q: AssetIndexQueries> AssetIndexEncoder<'a, Q> {
    pub fn new(assets: &'a Q, buffer_type: BufferType) -> Self {
        Self {
            assets,
            buffer_type,
        }
    }

    pub fn encode(self) -> GraphResult<EncodedAssetIndex> {
        let node_count = self.assets.node_count();
        let link_count = self.assets.link_count();

        let mut nodes = IdMapper::with_capacity(node_count);
        let mut node_ids = ColumnBuilder::<u32>::new("node_ids", node_count);
        let mut node_types = ColumnBuilder::<u8>::new("node_types", node_count);
        for (id, ty) in self.assets.iter_nodes() {
            if self.assets.has_link(id) {
                return Err(GraphError::AmbiguousAsset { id });
            }
            assign_fresh(&mut nodes, id)?;
            node_ids
                .push(id.get())
                .map_err(|_| overflow("nodes", node_count, nodes.len()))?;
            node_types
                .push(ty.tag())
                .map_err(|_| overflow("nodes", node_count, nodes.len()))?;
        }
        if nodes.len() != node_count {
            return Err(overflow("nodes", node_count, nodes.len()));
        }

        let mut links = IdMapper::with_capacity(link_count);
        let mut link_ids = ColumnBuilder::<u32>::new("link_ids", link_count);
        let mut link_types = ColumnBuilder::<u8>::new("link_types", link_count);
        for (id, ty) in self.assets.iter_links() {
            if nodes.contains(id) || self.assets.has_node(id) {
                return Err(GraphError::AmbiguousAsset { id });
            }
            assign_fresh(&mut links, id)?;
            link_ids
                .push(id.get())
                .map_err(|_| overflow("links", link_count, links.len()))?;
            link_types
                .push(ty.tag())
                .map_err(|_| overflow("links", link_count, links.len()))?;
        }
        if links.len() != link_count {
            return Err(overflow("links", link_count, links.len()));
        }

        let buffers = AssetIndexBuffers {
            node_ids: node_ids.finish(self.buffer_type)?,
            node_types: node_types.finish(self.buffer_type)?,
            link_ids: link_ids.finish(self.buffer_type)?,
            link_types: link_types.finish(self.buffer_type)?,
        };
        let digest = buffers.digest();

        tracing::trace!(node_count, link_count, "asset index encoded");
        Ok(EncodedAssetIndex {
            buffers,
            nodes,
            links,
            digest,
        })
    }
}

fn assign_fresh(mapper: &mut IdMapper, id: AssetId) -> GraphResult<()> {
    let next = mapper.len();
    if mapper.try_get_or_assign_idx(id)? as usize != next {
        return Err(GraphError::DuplicateId { id });
    }
    Ok(())
}

fn overflow(what: &'static str, expected: usize, actual: usize) -> GraphError {
    GraphError::CountMismatch {
        what,
        expected,
        actual,
    }
}

/// Read-only view over asset index columns.
///
/// Construction validates the columns and rebuilds the id -> index maps once.
#[derive(Debug, Clone)]
pub struct AssetIndexView {
    buffers: AssetIndexBuffers,
    nodes: IdMapper,
    links: IdMapper,
    digest: SnapshotDigest,
}

impl AssetIndexView {
    pub fn new(buffers: AssetIndexBuffers) -> GraphResult<Self> {
        let node_ids = Column::<u32>::new("node_ids", &buffers.node_ids)?;
        let link_ids = Column::<u32>::new("link_ids", &buffers.link_ids)?;
        check_same_len("node_types", node_ids.len(), buffers.node_types.len())?;
        check_same_len("link_types", link_ids.len(), buffers.link_types.len())?;

        if let Some(&tag) = buffers
            .node_types
            .iter()
            .find(|&&tag| NodeType::from_tag(tag).is_none())
        {
            return Err(GraphError::UnknownTypeTag { what: "node", tag });
        }
        if let Some(&tag) = buffers
            .link_types
            .iter()
            .find(|&&tag| LinkType::from_tag(tag).is_none())
        {
            return Err(GraphError::UnknownTypeTag { what: "link", tag });
        }

        let nodes = IdMapper::from_ids(node_ids.iter().map(AssetId::new))?;
        let links = IdMapper::from_ids(link_ids.iter().map(AssetId::new))?;
        if let Some(&id) = links.ids().iter().find(|&&id| nodes.contains(id)) {
            return Err(GraphError::AmbiguousAsset { id });
        }

        let digest = buffers.digest();
        Ok(Self {
            buffers,
            nodes,
            links,
            digest,
        })
    }

    pub fn buffers(&self) -> &AssetIndexBuffers {
        &self.buffers
    }

    pub fn into_buffers(self) -> AssetIndexBuffers {
        self.buffers
    }
}

fn check_same_len(what: &'static str, ids: usize, types: usize) -> GraphResult<()> {
    if ids != types {
        return Err(GraphError::MalformedBuffer {
            what,
            detail: format!("{} type tags for {} ids", types, ids),
        });
    }
    Ok(())
}

impl DenseAssetIndex for AssetIndexView {
    fn node_mapper(&self) -> &IdMapper {
        &self.nodes
    }

    fn link_mapper(&self) -> &IdMapper {
        &self.links
    }

    fn digest(&self) -> SnapshotDigest {
        self.digest
    }
}

impl AssetIndexQueries for AssetIndexView {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn link_count(&self) -> usize {
        self.links.len()
    }

    fn has_node(&self, id: AssetId) -> bool {
        self.nodes.contains(id)
    }

    fn has_link(&self, id: AssetId) -> bool {
        self.links.contains(id)
    }

    fn node_type(&self, id: AssetId) -> Option<NodeType> {
        let idx = self.nodes.try_idx(id)?;
        self.buffers
            .node_types
            .get(idx as usize)
            .copied()
            .and_then(NodeType::from_tag)
    }

    fn link_type(&self, id: AssetId) -> Option<LinkType> {
        let idx = self.links.try_idx(id)?;
        self.buffers
            .link_types
            .get(idx as usize)
            .copied()
            .and_then(LinkType::from_tag)
    }

    fn iter_nodes(&self) -> impl Iterator<Item = (AssetId, NodeType)> + '_ {
        self.nodes
            .ids()
            .iter()
            .zip(self.buffers.node_types.iter())
            .filter_map(|(&id, &tag)| NodeType::from_tag(tag).map(|ty| (id, ty)))
    }

    fn iter_links(&self) -> impl Iterator<Item = (AssetId, LinkType)> + '_ {
        self.links
            .ids()
            .iter()
            .zip(self.buffers.link_types.iter())
            .filter_map(|(&id, &tag)| LinkType::from_tag(tag).map(|ty| (id, ty)))
    }
}
