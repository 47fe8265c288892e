//! Live, editable hydraulic model.
//!
//! `HydraulicModel` owns the asset records and keeps two derived structures in
//! step with them: an `AssetIndex` (id -> type) and a `Topology` (connectivity).

use std::collections::HashMap;

use hn_core::AssetId;

use crate::asset::{Asset, AssetType, LinkType, NodeType};
use crate::error::{GraphError, GraphResult};
use crate::queries::{AssetIndexQueries, TopologyQueries};

/// Id -> type registry with stable iteration order.
#[derive(Debug, Clone, Default)]
pub struct AssetIndex {
    node_order: Vec<AssetId>,
    link_order: Vec<AssetId>,
    node_types: HashMap<AssetId, NodeType>,
    link_types: HashMap<AssetId, LinkType>,
}

impl AssetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node. An id previously registered as a link is moved over.
    pub fn add_node(&mut self, id: AssetId, ty: NodeType) {
        self.remove_link(id);
        if self.node_types.insert(id, ty).is_none() {
            self.node_order.push(id);
        }
    }

    /// Register a link. An id previously registered as a node is moved over.
    pub fn add_link(&mut self, id: AssetId, ty: LinkType) {
        self.remove_node(id);
        if self.link_types.insert(id, ty).is_none() {
            self.link_order.push(id);
        }
    }

    pub fn remove(&mut self, id: AssetId) {
        self.remove_node(id);
        self.remove_link(id);
    }

    fn remove_node(&mut self, id: AssetId) {
        if self.node_types.remove(&id).is_some() {
            self.node_order.retain(|&n| n != id);
        }
    }

    fn remove_link(&mut self, id: AssetId) {
        if self.link_types.remove(&id).is_some() {
            self.link_order.retain(|&l| l != id);
        }
    }
}

impl AssetIndexQueries for AssetIndex {
    fn node_count(&self) -> usize {
        self.node_types.len()
    }

    fn link_count(&self) -> usize {
        self.link_types.len()
    }

    fn has_node(&self, id: AssetId) -> bool {
        self.node_types.contains_key(&id)
    }

    fn has_link(&self, id: AssetId) -> bool {
        self.link_types.contains_key(&id)
    }

    fn node_type(&self, id: AssetId) -> Option<NodeType> {
        self.node_types.get(&id).copied()
    }

    fn link_type(&self, id: AssetId) -> Option<LinkType> {
        self.link_types.get(&id).copied()
    }

    fn iter_nodes(&self) -> impl Iterator<Item = (AssetId, NodeType)> + '_ {
        self.node_order
            .iter()
            .filter_map(|&id| self.node_types.get(&id).map(|&ty| (id, ty)))
    }

    fn iter_links(&self) -> impl Iterator<Item = (AssetId, LinkType)> + '_ {
        self.link_order
            .iter()
            .filter_map(|&id| self.link_types.get(&id).map(|&ty| (id, ty)))
    }
}

/// Node/link connectivity.
///
/// Incident links are kept in insertion order. A self-loop is listed once.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    node_links: HashMap<AssetId, Vec<AssetId>>,
    link_nodes: HashMap<AssetId, [AssetId; 2]>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with no incident links. No-op if present.
    pub fn add_node(&mut self, id: AssetId) {
        self.node_links.entry(id).or_default();
    }

    /// Connect `start` and `end`, adding either node if missing.
    /// Re-adding an existing link replaces its endpoints.
    pub fn add_link(&mut self, link: AssetId, start: AssetId, end: AssetId) {
        self.remove_link(link);
        self.link_nodes.insert(link, [start, end]);
        self.node_links.entry(start).or_default().push(link);
        if end != start {
            self.node_links.entry(end).or_default().push(link);
        }
    }

    pub fn remove_link(&mut self, link: AssetId) {
        let Some(endpoints) = self.link_nodes.remove(&link) else {
            return;
        };
        for node in endpoints {
            if let Some(links) = self.node_links.get_mut(&node) {
                links.retain(|&l| l != link);
            }
        }
    }

    /// Remove a node together with every link touching it.
    pub fn remove_node(&mut self, node: AssetId) {
        if let Some(links) = self.node_links.remove(&node) {
            for link in links {
                self.remove_link(link);
            }
        }
    }
}

impl TopologyQueries for Topology {
    fn has_node(&self, id: AssetId) -> bool {
        self.node_links.contains_key(&id)
    }

    fn has_link(&self, id: AssetId) -> bool {
        self.link_nodes.contains_key(&id)
    }

    fn link_nodes(&self, link: AssetId) -> Option<[AssetId; 2]> {
        self.link_nodes.get(&link).copied()
    }

    fn node_links(&self, node: AssetId) -> impl Iterator<Item = AssetId> + '_ {
        self.node_links
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .copied()
    }

    fn degree(&self, node: AssetId) -> usize {
        self.node_links.get(&node).map_or(0, Vec::len)
    }
}

/// Editable network: asset records plus derived index and topology.
#[derive(Debug, Clone, Default)]
pub struct HydraulicModel {
    assets: HashMap<AssetId, Asset>,
    asset_index: AssetIndex,
    topology: Topology,
}

impl HydraulicModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(
        &mut self,
        id: AssetId,
        label: impl Into<String>,
        ty: NodeType,
    ) -> GraphResult<()> {
        if self.assets.contains_key(&id) {
            return Err(GraphError::DuplicateId { id });
        }
        self.assets.insert(
            id,
            Asset {
                id,
                label: label.into(),
                asset_type: AssetType::Node(ty),
            },
        );
        self.asset_index.add_node(id, ty);
        self.topology.add_node(id);
        Ok(())
    }

    /// Add a link between two existing nodes.
    pub fn add_link(
        &mut self,
        id: AssetId,
        label: impl Into<String>,
        ty: LinkType,
        start: AssetId,
        end: AssetId,
    ) -> GraphResult<()> {
        if self.assets.contains_key(&id) {
            return Err(GraphError::DuplicateId { id });
        }
        for node in [start, end] {
            if !self.asset_index.has_node(node) {
                return Err(GraphError::DanglingEndpoint { link: id, node });
            }
        }
        self.assets.insert(
            id,
            Asset {
                id,
                label: label.into(),
                asset_type: AssetType::Link(ty),
            },
        );
        self.asset_index.add_link(id, ty);
        self.topology.add_link(id, start, end);
        Ok(())
    }

    /// Remove an asset. Removing a node also removes its incident links.
    pub fn remove_asset(&mut self, id: AssetId) -> Option<Asset> {
        let asset = self.assets.remove(&id)?;
        if asset.asset_type.is_node() {
            let incident: Vec<AssetId> = self.topology.node_links(id).collect();
            for link in incident {
                self.assets.remove(&link);
                self.asset_index.remove(link);
            }
            self.topology.remove_node(id);
        } else {
            self.topology.remove_link(id);
        }
        self.asset_index.remove(id);
        Some(asset)
    }

    pub fn asset(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(&id)
    }

    pub fn label(&self, id: AssetId) -> Option<&str> {
        self.assets.get(&id).map(|a| a.label.as_str())
    }

    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn asset_index(&self) -> &AssetIndex {
        &self.asset_index
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }
}
