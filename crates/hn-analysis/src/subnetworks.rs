//! Connectivity trace: splits a network into disconnected subnetworks.
//!
//! Components are discovered by depth-first search from each unvisited node in
//! asset index order. Isolated nodes are left to the orphan check.

use std::collections::HashSet;

use hn_core::AssetId;
use hn_graph::{AssetIndexQueries, LinkType, NodeType, TopologyQueries};
use serde::{Deserialize, Serialize};

use crate::analysis::NetworkAnalysis;
use crate::cancel::Interrupt;

/// One connected component with at least two nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnetwork {
    /// Discovery order, counted over every component including skipped ones.
    pub subnetwork_id: usize,
    /// Nodes in traversal order.
    pub nodes: Vec<AssetId>,
    /// Links in traversal order.
    pub links: Vec<AssetId>,
    /// Tanks and reservoirs.
    pub supply_source_count: usize,
    pub pipe_count: usize,
}

impl Subnetwork {
    pub fn has_supply(&self) -> bool {
        self.supply_source_count > 0
    }
}

/// Subnetworks ordered by node count, largest first. Ties keep discovery order.
///
/// Stops early once `interrupt` is raised and returns what was found so far.
pub fn find_subnetworks<T, A>(topology: &T, assets: &A, interrupt: &Interrupt) -> Vec<Subnetwork>
where
    T: TopologyQueries,
    A: AssetIndexQueries,
{
    let mut visited = HashSet::with_capacity(assets.node_count());
    let mut subnetworks = Vec::new();
    let mut next_id = 0;

    for (start, _) in assets.iter_nodes() {
        if visited.contains(&start) {
            continue;
        }
        if interrupt.is_raised() {
            tracing::debug!(found = subnetworks.len(), "connectivity trace interrupted");
            break;
        }
        let subnetwork = trace(start, next_id, &mut visited, topology, assets);
        next_id += 1;
        if subnetwork.nodes.len() > 1 {
            subnetworks.push(subnetwork);
        }
    }

    subnetworks.sort_by(|a, b| b.nodes.len().cmp(&a.nodes.len()));
    subnetworks
}

fn trace<T, A>(
    start: AssetId,
    subnetwork_id: usize,
    visited: &mut HashSet<AssetId>,
    topology: &T,
    assets: &A,
) -> Subnetwork
where
    T: TopologyQueries,
    A: AssetIndexQueries,
{
    let mut subnetwork = Subnetwork {
        subnetwork_id,
        ..Subnetwork::default()
    };
    let mut visited_links = HashSet::new();
    let mut stack = vec![start];

    while let Some(node) = stack.pop() {
        if !visited.insert(node) {
            continue;
        }
        subnetwork.nodes.push(node);
        if matches!(
            assets.node_type(node),
            Some(NodeType::Tank | NodeType::Reservoir)
        ) {
            subnetwork.supply_source_count += 1;
        }

        for link in topology.node_links(node) {
            if !visited_links.insert(link) {
                continue;
            }
            if assets.link_type(link) == Some(LinkType::Pipe) {
                subnetwork.pipe_count += 1;
            }
            subnetwork.links.push(link);

            let Some([from, to]) = topology.link_nodes(link) else {
                continue;
            };
            let neighbour = if from == node { to } else { from };
            if !visited.contains(&neighbour) {
                stack.push(neighbour);
            }
        }
    }

    subnetwork
}

/// Dispatchable wrapper around [`find_subnetworks`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SubnetworksCheck;

impl NetworkAnalysis for SubnetworksCheck {
    type Output = Vec<Subnetwork>;

    const NAME: &'static str = "subnetworks";

    fn run<T, A>(&self, topology: &T, assets: &A, interrupt: &Interrupt) -> Vec<Subnetwork>
    where
        T: TopologyQueries,
        A: AssetIndexQueries,
    {
        find_subnetworks(topology, assets, interrupt)
    }
}
