//! Orphan asset detection.
//!
//! A node is orphaned when nothing connects to it. A valve or pump is orphaned
//! when neither of its endpoints connects to anything else. Pipes are never
//! reported: a pipe between two otherwise unconnected nodes is a valid (if
//! small) network.

use hn_core::AssetId;
use hn_graph::{AssetIndexQueries, LinkType, TopologyQueries};
use serde::{Deserialize, Serialize};

use crate::analysis::NetworkAnalysis;
use crate::cancel::Interrupt;

/// Raw orphan ids, in asset index iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanAssets {
    pub orphan_nodes: Vec<AssetId>,
    pub orphan_links: Vec<AssetId>,
}

impl OrphanAssets {
    pub fn is_empty(&self) -> bool {
        self.orphan_nodes.is_empty() && self.orphan_links.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orphan_nodes.len() + self.orphan_links.len()
    }
}

pub fn find_orphan_assets<T, A>(topology: &T, assets: &A) -> OrphanAssets
where
    T: TopologyQueries,
    A: AssetIndexQueries,
{
    let orphan_nodes = assets
        .iter_nodes()
        .filter(|&(id, _)| topology.degree(id) == 0)
        .map(|(id, _)| id)
        .collect();

    let orphan_links = assets
        .iter_links()
        .filter(|&(_, ty)| ty != LinkType::Pipe)
        .filter(|&(id, _)| {
            topology
                .link_nodes(id)
                .is_some_and(|ends| ends.iter().all(|&node| topology.degree(node) <= 1))
        })
        .map(|(id, _)| id)
        .collect();

    OrphanAssets {
        orphan_nodes,
        orphan_links,
    }
}

/// Dispatchable wrapper around [`find_orphan_assets`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OrphanAssetsCheck;

impl NetworkAnalysis for OrphanAssetsCheck {
    type Output = OrphanAssets;

    const NAME: &'static str = "orphan-assets";

    fn run<T, A>(&self, topology: &T, assets: &A, _interrupt: &Interrupt) -> OrphanAssets
    where
        T: TopologyQueries,
        A: AssetIndexQueries,
    {
        find_orphan_assets(topology, assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_graph::{HydraulicModel, ModelBuilder};

    fn id(raw: u32) -> AssetId {
        AssetId::new(raw)
    }

    fn check(model: &HydraulicModel) -> OrphanAssets {
        find_orphan_assets(model.topology(), model.asset_index())
    }

    #[test]
    fn finds_unconnected_nodes() {
        let mut builder = ModelBuilder::new();
        builder
            .junction(1, "J1")
            .junction(2, "J2")
            .pipe(3, "P1", 1, 2)
            .junction(4, "Orphan");
        let orphans = check(&builder.build().unwrap());

        assert_eq!(orphans.orphan_nodes, vec![id(4)]);
        assert!(orphans.orphan_links.is_empty());
    }

    #[test]
    fn finds_valves_and_pumps_with_no_other_connections() {
        for pump in [false, true] {
            let mut builder = ModelBuilder::new();
            builder
                .junction(1, "J1")
                .junction(2, "J2")
                .pipe(3, "P1", 1, 2)
                .tank(4, "T1")
                .junction(5, "NoPipeNode");
            if pump {
                builder.pump(6, "Orphan", 4, 5);
            } else {
                builder.valve(6, "Orphan", 4, 5);
            }
            let orphans = check(&builder.build().unwrap());

            assert_eq!(orphans.orphan_links, vec![id(6)]);
            assert!(orphans.orphan_nodes.is_empty());
        }
    }

    #[test]
    fn nodes_on_valves_or_pumps_are_connected() {
        let mut builder = ModelBuilder::new();
        builder
            .tank(1, "T1")
            .junction(2, "J1")
            .valve(3, "V1", 1, 2)
            .pump(4, "PU1", 1, 2)
            .junction(5, "J2")
            .pipe(6, "P1", 2, 5);
        let orphans = check(&builder.build().unwrap());
        assert!(orphans.is_empty());
    }

    #[test]
    fn isolated_pipe_is_not_an_orphan() {
        let mut builder = ModelBuilder::new();
        builder.junction(1, "J1").junction(2, "J2").pipe(3, "P1", 1, 2);
        assert!(check(&builder.build().unwrap()).is_empty());
    }

    #[test]
    fn valve_with_one_connected_end_is_kept() {
        let mut builder = ModelBuilder::new();
        builder
            .reservoir(1, "R1")
            .junction(2, "J1")
            .junction(3, "J2")
            .valve(4, "V1", 1, 2)
            .pipe(5, "P1", 2, 3);
        assert!(check(&builder.build().unwrap()).orphan_links.is_empty());
    }

    #[test]
    fn output_serializes_with_raw_ids() {
        let orphans = OrphanAssets {
            orphan_nodes: vec![id(4)],
            orphan_links: vec![id(6), id(7)],
        };
        assert_eq!(orphans.len(), 3);
        let json = serde_json::to_string(&orphans).unwrap();
        assert_eq!(json, r#"{"orphan_nodes":[4],"orphan_links":[6,7]}"#);
    }
}
