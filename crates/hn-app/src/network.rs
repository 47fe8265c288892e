//! Network files: YAML definitions of nodes and links.

use std::path::Path;

use hn_core::AssetId;
use hn_graph::{HydraulicModel, LinkType, ModelBuilder, NodeType};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NetworkDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub links: Vec<LinkDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDef {
    pub id: u32,
    pub label: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkDef {
    pub id: u32,
    pub label: String,
    pub kind: LinkKind,
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Junction,
    Tank,
    Reservoir,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Pipe,
    Valve,
    Pump,
}

impl From<NodeKind> for NodeType {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Junction => NodeType::Junction,
            NodeKind::Tank => NodeType::Tank,
            NodeKind::Reservoir => NodeType::Reservoir,
        }
    }
}

impl From<LinkKind> for LinkType {
    fn from(kind: LinkKind) -> Self {
        match kind {
            LinkKind::Pipe => LinkType::Pipe,
            LinkKind::Valve => LinkType::Valve,
            LinkKind::Pump => LinkType::Pump,
        }
    }
}

/// Load a network definition from a YAML file.
pub fn load_network(path: &Path) -> AppResult<NetworkDef> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_yaml::from_str(&content).map_err(|e| AppError::Yaml {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn save_network(path: &Path, network: &NetworkDef) -> AppResult<()> {
    let content = serde_yaml::to_string(network).map_err(|e| AppError::Yaml {
        path: path.to_path_buf(),
        source: e,
    })?;
    std::fs::write(path, content).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Build the live model. Structural problems surface as graph errors.
pub fn build_model(network: &NetworkDef) -> AppResult<HydraulicModel> {
    let mut builder = ModelBuilder::new();
    for node in &network.nodes {
        builder.add_node(AssetId::new(node.id), node.label.clone(), node.kind.into());
    }
    for link in &network.links {
        builder.add_link(
            AssetId::new(link.id),
            link.label.clone(),
            link.kind.into(),
            AssetId::new(link.start),
            AssetId::new(link.end),
        );
    }
    let model = builder.build()?;
    tracing::debug!(
        name = %network.name,
        nodes = network.nodes.len(),
        links = network.links.len(),
        "network built"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_graph::{AssetIndexQueries, GraphError, TopologyQueries};

    const YAML: &str = r#"
name: demo
nodes:
  - { id: 1, label: J1, kind: junction }
  - { id: 2, label: T1, kind: tank }
links:
  - { id: 10, label: P1, kind: pipe, start: 1, end: 2 }
"#;

    #[test]
    fn yaml_builds_a_model() {
        let network: NetworkDef = serde_yaml::from_str(YAML).unwrap();
        let model = build_model(&network).unwrap();

        assert_eq!(model.asset_index().node_count(), 2);
        assert_eq!(
            model.asset_index().node_type(AssetId::new(2)),
            Some(NodeType::Tank)
        );
        assert_eq!(
            model.topology().link_nodes(AssetId::new(10)),
            Some([AssetId::new(1), AssetId::new(2)])
        );
        assert_eq!(model.label(AssetId::new(10)), Some("P1"));
    }

    #[test]
    fn dangling_link_is_rejected() {
        let mut network: NetworkDef = serde_yaml::from_str(YAML).unwrap();
        network.links[0].end = 99;
        assert!(matches!(
            build_model(&network),
            Err(AppError::Graph(GraphError::DanglingEndpoint { .. }))
        ));
    }
}
