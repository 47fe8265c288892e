//! Read-only query contracts.
//!
//! The live model and the decoded columnar views both implement these traits,
//! so analyses run unchanged against either side of the encode boundary.

use hn_core::AssetId;

use crate::asset::{AssetType, LinkType, NodeType};

/// Type and membership queries over the assets of one snapshot.
pub trait AssetIndexQueries {
    fn node_count(&self) -> usize;
    fn link_count(&self) -> usize;
    fn has_node(&self, id: AssetId) -> bool;
    fn has_link(&self, id: AssetId) -> bool;

    /// Node type, or `None` when `id` is not a node.
    fn node_type(&self, id: AssetId) -> Option<NodeType>;

    /// Link type, or `None` when `id` is not a link.
    fn link_type(&self, id: AssetId) -> Option<LinkType>;

    fn asset_type(&self, id: AssetId) -> Option<AssetType> {
        self.node_type(id)
            .map(AssetType::Node)
            .or_else(|| self.link_type(id).map(AssetType::Link))
    }

    fn iter_nodes(&self) -> impl Iterator<Item = (AssetId, NodeType)> + '_;
    fn iter_links(&self) -> impl Iterator<Item = (AssetId, LinkType)> + '_;
}

/// Connectivity queries over the nodes and links of one snapshot.
pub trait TopologyQueries {
    fn has_node(&self, id: AssetId) -> bool;
    fn has_link(&self, id: AssetId) -> bool;

    /// `[start, end]` of a link.
    fn link_nodes(&self, link: AssetId) -> Option<[AssetId; 2]>;

    /// Links incident to a node. Empty for unknown nodes.
    fn node_links(&self, node: AssetId) -> impl Iterator<Item = AssetId> + '_;

    fn degree(&self, node: AssetId) -> usize;
}
