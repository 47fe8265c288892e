//! Incremental model builder.

use hn_core::AssetId;

use crate::asset::{LinkType, NodeType};
use crate::error::GraphResult;
use crate::model::HydraulicModel;
use crate::validate;

#[derive(Debug, Clone)]
pub(crate) struct PendingNode {
    pub(crate) id: AssetId,
    pub(crate) label: String,
    pub(crate) ty: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct PendingLink {
    pub(crate) id: AssetId,
    pub(crate) label: String,
    pub(crate) ty: LinkType,
    pub(crate) start: AssetId,
    pub(crate) end: AssetId,
}

/// Builder for constructing a model incrementally.
///
/// Links may reference nodes declared later; everything is checked in `build()`.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    nodes: Vec<PendingNode>,
    links: Vec<PendingLink>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: AssetId, label: impl Into<String>, ty: NodeType) -> &mut Self {
        self.nodes.push(PendingNode {
            id,
            label: label.into(),
            ty,
        });
        self
    }

    pub fn add_link(
        &mut self,
        id: AssetId,
        label: impl Into<String>,
        ty: LinkType,
        start: AssetId,
        end: AssetId,
    ) -> &mut Self {
        self.links.push(PendingLink {
            id,
            label: label.into(),
            ty,
            start,
            end,
        });
        self
    }

    pub fn junction(&mut self, id: u32, label: impl Into<String>) -> &mut Self {
        self.add_node(AssetId::new(id), label, NodeType::Junction)
    }

    pub fn tank(&mut self, id: u32, label: impl Into<String>) -> &mut Self {
        self.add_node(AssetId::new(id), label, NodeType::Tank)
    }

    pub fn reservoir(&mut self, id: u32, label: impl Into<String>) -> &mut Self {
        self.add_node(AssetId::new(id), label, NodeType::Reservoir)
    }

    pub fn pipe(&mut self, id: u32, label: impl Into<String>, start: u32, end: u32) -> &mut Self {
        self.link(id, label, LinkType::Pipe, start, end)
    }

    pub fn valve(&mut self, id: u32, label: impl Into<String>, start: u32, end: u32) -> &mut Self {
        self.link(id, label, LinkType::Valve, start, end)
    }

    pub fn pump(&mut self, id: u32, label: impl Into<String>, start: u32, end: u32) -> &mut Self {
        self.link(id, label, LinkType::Pump, start, end)
    }

    fn link(
        &mut self,
        id: u32,
        label: impl Into<String>,
        ty: LinkType,
        start: u32,
        end: u32,
    ) -> &mut Self {
        self.add_link(
            AssetId::new(id),
            label,
            ty,
            AssetId::new(start),
            AssetId::new(end),
        )
    }

    /// Validate and assemble the model. Nodes keep declaration order, then links.
    pub fn build(&mut self) -> GraphResult<HydraulicModel> {
        validate::validate_structure(&self.nodes, &self.links)?;

        let mut model = HydraulicModel::new();
        for node in self.nodes.drain(..) {
            model.add_node(node.id, node.label, node.ty)?;
        }
        for link in self.links.drain(..) {
            model.add_link(link.id, link.label, link.ty, link.start, link.end)?;
        }

        tracing::debug!(assets = model.len(), "model built");
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::queries::{AssetIndexQueries, TopologyQueries};

    #[test]
    fn builder_basic() {
        let mut builder = ModelBuilder::new();
        builder
            .reservoir(1, "R1")
            .junction(2, "J1")
            .pump(10, "PU1", 1, 2);
        assert_eq!(builder.nodes.len(), 2);
        assert_eq!(builder.links.len(), 1);

        let model = builder.build().unwrap();
        assert_eq!(model.asset_index().node_count(), 2);
        assert_eq!(
            model.asset_index().link_type(AssetId::new(10)),
            Some(LinkType::Pump)
        );
        assert_eq!(model.topology().degree(AssetId::new(1)), 1);
    }

    #[test]
    fn links_may_precede_their_nodes() {
        let mut builder = ModelBuilder::new();
        builder.pipe(10, "P1", 1, 2).junction(1, "J1").junction(2, "J2");
        let model = builder.build().unwrap();
        assert!(model.topology().has_link(AssetId::new(10)));
    }

    #[test]
    fn build_rejects_bad_structure() {
        let mut builder = ModelBuilder::new();
        builder.junction(1, "J1").junction(1, "J1 again");
        assert_eq!(
            builder.build().unwrap_err(),
            GraphError::DuplicateId { id: AssetId::new(1) }
        );

        let mut builder = ModelBuilder::new();
        builder.junction(1, "J1").pipe(1, "P1", 1, 1);
        assert_eq!(
            builder.build().unwrap_err(),
            GraphError::AmbiguousAsset { id: AssetId::new(1) }
        );

        let mut builder = ModelBuilder::new();
        builder.junction(1, "J1").pipe(5, "P1", 1, 2);
        assert_eq!(
            builder.build().unwrap_err(),
            GraphError::DanglingEndpoint {
                link: AssetId::new(5),
                node: AssetId::new(2)
            }
        );
    }
}
