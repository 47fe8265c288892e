//! hn-graph: network model layer for hydronet.
//!
//! Provides:
//! - Asset types and the live hydraulic model (`HydraulicModel`, `AssetIndex`, `Topology`)
//! - Incremental model builder with validation
//! - Dense re-indexing of sparse asset ids (`IdMapper`)
//! - Query contracts shared by the live model and decoded views
//! - Columnar codecs: AssetIndex and Topology encoders/views
//!
//! # Example
//!
//! ```
//! use hn_core::BufferType;
//! use hn_graph::{AssetIndexView, ModelBuilder, TopologyQueries, TopologyView, encode_network};
//! use hn_core::AssetId;
//!
//! let mut builder = ModelBuilder::new();
//! builder.junction(1, "J1").junction(2, "J2").pipe(3, "P1", 1, 2);
//! let model = builder.build().unwrap();
//!
//! let encoded = encode_network(model.topology(), model.asset_index(), BufferType::Array).unwrap();
//! let assets = AssetIndexView::new(encoded.asset_index).unwrap();
//! let topology = TopologyView::new(encoded.topology, &assets).unwrap();
//!
//! assert_eq!(topology.link_nodes(AssetId::new(3)), Some([AssetId::new(1), AssetId::new(2)]));
//! ```

pub mod asset;
pub mod builder;
pub mod codec;
pub mod error;
pub mod indexing;
pub mod model;
pub mod queries;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use asset::{Asset, AssetType, LinkType, NodeType};
pub use builder::ModelBuilder;
pub use codec::{
    AssetIndexBuffers, AssetIndexEncoder, AssetIndexView, DenseAssetIndex, EncodedAssetIndex,
    EncodedNetwork, TopologyBuffers, TopologyEncoder, TopologyView, encode_network, with_views,
};
pub use error::{GraphError, GraphResult};
pub use indexing::IdMapper;
pub use model::{AssetIndex, HydraulicModel, Topology};
pub use queries::{AssetIndexQueries, TopologyQueries};
