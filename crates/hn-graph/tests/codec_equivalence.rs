//! Decoded views must answer every query exactly like the live model.

use hn_core::{AssetId, BufferType};
use hn_graph::{
    AssetIndexQueries, AssetIndexView, DenseAssetIndex, HydraulicModel, LinkType, NodeType,
    TopologyQueries, TopologyView, encode_network, with_views,
};
use proptest::prelude::*;
use proptest::sample::Index;

const NODE_TYPES: [NodeType; 3] = [NodeType::Junction, NodeType::Tank, NodeType::Reservoir];
const LINK_TYPES: [LinkType; 3] = [LinkType::Pipe, LinkType::Valve, LinkType::Pump];

/// Random network: distinct sparse ids, the first `node_count` of them nodes,
/// the rest links between random nodes (self-loops allowed).
fn network() -> impl Strategy<Value = HydraulicModel> {
    prop::collection::btree_set(1_u32..1_000_000, 2..64)
        .prop_flat_map(|ids| {
            let ids: Vec<u32> = ids.into_iter().rev().collect();
            let len = ids.len();
            (
                Just(ids),
                1..len,
                prop::collection::vec((0_usize..3, any::<Index>(), any::<Index>()), len),
            )
        })
        .prop_map(|(ids, node_count, picks)| {
            let mut model = HydraulicModel::new();
            for (raw, (ty, _, _)) in ids[..node_count].iter().zip(&picks) {
                model
                    .add_node(AssetId::new(*raw), format!("N{}", raw), NODE_TYPES[*ty])
                    .unwrap();
            }
            for (raw, (ty, start, end)) in ids[node_count..].iter().zip(&picks) {
                let start = AssetId::new(ids[start.index(node_count)]);
                let end = AssetId::new(ids[end.index(node_count)]);
                model
                    .add_link(AssetId::new(*raw), format!("L{}", raw), LINK_TYPES[*ty], start, end)
                    .unwrap();
            }
            model
        })
}

fn buffer_type() -> impl Strategy<Value = BufferType> {
    prop_oneof![Just(BufferType::Array), Just(BufferType::Shared)]
}

proptest! {
    #[test]
    fn views_match_live_model(model in network(), buffer_type in buffer_type()) {
        let live_index = model.asset_index();
        let live_topology = model.topology();
        let encoded = encode_network(live_topology, live_index, buffer_type).unwrap();
        prop_assert_eq!(encoded.buffer_type(), buffer_type);

        let assets = AssetIndexView::new(encoded.asset_index).unwrap();
        let topology = TopologyView::new(encoded.topology, &assets).unwrap();

        prop_assert_eq!(assets.node_count(), live_index.node_count());
        prop_assert_eq!(assets.link_count(), live_index.link_count());
        prop_assert_eq!(
            assets.iter_nodes().collect::<Vec<_>>(),
            live_index.iter_nodes().collect::<Vec<_>>()
        );
        prop_assert_eq!(
            assets.iter_links().collect::<Vec<_>>(),
            live_index.iter_links().collect::<Vec<_>>()
        );

        for asset in model.assets() {
            let id = asset.id;
            prop_assert_eq!(assets.asset_type(id), Some(asset.asset_type));
            prop_assert_eq!(assets.has_node(id), live_index.has_node(id));
            prop_assert_eq!(topology.has_link(id), live_topology.has_link(id));
            prop_assert_eq!(topology.link_nodes(id), live_topology.link_nodes(id));
            prop_assert_eq!(topology.degree(id), live_topology.degree(id));
            prop_assert_eq!(
                topology.node_links(id).collect::<Vec<_>>(),
                live_topology.node_links(id).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn dense_indices_follow_iteration_order(model in network()) {
        let encoded = encode_network(model.topology(), model.asset_index(), BufferType::Array).unwrap();
        let assets = AssetIndexView::new(encoded.asset_index).unwrap();
        for (i, (id, _)) in model.asset_index().iter_nodes().enumerate() {
            prop_assert_eq!(assets.node_idx(id).unwrap(), i as u32);
            prop_assert_eq!(assets.node_mapper().id(i as u32), id);
        }
        for (i, (id, _)) in model.asset_index().iter_links().enumerate() {
            prop_assert_eq!(assets.link_idx(id).unwrap(), i as u32);
        }
    }
}

#[test]
fn encoding_is_deterministic() {
    let mut model = HydraulicModel::new();
    model
        .add_node(AssetId::new(7), "J7", NodeType::Junction)
        .unwrap();
    model
        .add_node(AssetId::new(3), "R3", NodeType::Reservoir)
        .unwrap();
    model
        .add_link(AssetId::new(1), "P1", LinkType::Pipe, AssetId::new(3), AssetId::new(7))
        .unwrap();

    let a = encode_network(model.topology(), model.asset_index(), BufferType::Array).unwrap();
    let b = encode_network(model.topology(), model.asset_index(), BufferType::Shared).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.topology.asset_index_digest, a.asset_index.digest());
    assert_eq!(a.byte_len(), 2 * 4 + 2 + 4 + 1 + 2 * 4 + 3 * 4 + 2 * 4);
}

#[test]
fn with_views_decodes_both_sides() {
    let mut model = HydraulicModel::new();
    model
        .add_node(AssetId::new(1), "J1", NodeType::Junction)
        .unwrap();
    model
        .add_node(AssetId::new(2), "T1", NodeType::Tank)
        .unwrap();
    model
        .add_link(AssetId::new(3), "V1", LinkType::Valve, AssetId::new(1), AssetId::new(2))
        .unwrap();

    let encoded = encode_network(model.topology(), model.asset_index(), BufferType::Array).unwrap();
    let degree = with_views(encoded, |topology, assets| {
        assert_eq!(assets.link_type(AssetId::new(3)), Some(LinkType::Valve));
        topology.degree(AssetId::new(2))
    })
    .unwrap();
    assert_eq!(degree, 1);
}
