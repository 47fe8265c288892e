//! Builder -> model -> encode round trip on a small realistic network.

use hn_core::{AssetId, BufferType};
use hn_graph::{
    AssetIndexQueries, GraphError, ModelBuilder, TopologyQueries, encode_network, with_views,
};

#[test]
fn builder_to_views() {
    let mut builder = ModelBuilder::new();
    builder
        .reservoir(100, "Source")
        .junction(200, "J-A")
        .junction(300, "J-B")
        .tank(400, "Storage")
        .pump(1, "Booster", 100, 200)
        .pipe(2, "Main", 200, 300)
        .pipe(3, "Bypass", 200, 300)
        .valve(4, "Inlet", 300, 400);
    let mut model = builder.build().unwrap();

    let encoded = encode_network(model.topology(), model.asset_index(), BufferType::Array).unwrap();
    with_views(encoded, |topology, assets| {
        assert_eq!(assets.node_count(), 4);
        assert_eq!(assets.link_count(), 4);
        assert_eq!(topology.degree(AssetId::new(200)), 3);
        assert_eq!(
            topology.node_links(AssetId::new(300)).collect::<Vec<_>>(),
            vec![AssetId::new(2), AssetId::new(3), AssetId::new(4)]
        );
    })
    .unwrap();

    // Edits are picked up by the next snapshot.
    model.remove_asset(AssetId::new(300));
    let encoded = encode_network(model.topology(), model.asset_index(), BufferType::Array).unwrap();
    with_views(encoded, |topology, assets| {
        assert_eq!(assets.node_count(), 3);
        assert_eq!(assets.link_count(), 1);
        assert_eq!(topology.degree(AssetId::new(400)), 0);
    })
    .unwrap();
}

#[test]
fn build_reports_first_problem() {
    let mut builder = ModelBuilder::new();
    builder.junction(1, "J1").pipe(2, "P1", 1, 3);
    let err = builder.build().unwrap_err();
    assert_eq!(
        err,
        GraphError::DanglingEndpoint {
            link: AssetId::new(2),
            node: AssetId::new(3)
        }
    );
    assert!(err.to_string().contains("non-existent node"));
}
