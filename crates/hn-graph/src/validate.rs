//! Model validation run by the builder before anything is committed.

use std::collections::HashSet;

use hn_core::AssetId;

use crate::builder::{PendingLink, PendingNode};
use crate::error::{GraphError, GraphResult};

/// Ids are unique across nodes and links, and every link endpoint is a node.
pub(crate) fn validate_structure(nodes: &[PendingNode], links: &[PendingLink]) -> GraphResult<()> {
    let mut seen: HashSet<AssetId> = HashSet::with_capacity(nodes.len() + links.len());
    let mut node_ids: HashSet<AssetId> = HashSet::with_capacity(nodes.len());

    for node in nodes {
        if !seen.insert(node.id) {
            return Err(GraphError::DuplicateId { id: node.id });
        }
        node_ids.insert(node.id);
    }

    for link in links {
        if !seen.insert(link.id) {
            // Same id on a node and a link is ambiguous rather than a plain duplicate
            return Err(if node_ids.contains(&link.id) {
                GraphError::AmbiguousAsset { id: link.id }
            } else {
                GraphError::DuplicateId { id: link.id }
            });
        }
        for node in [link.start, link.end] {
            if !node_ids.contains(&node) {
                return Err(GraphError::DanglingEndpoint {
                    link: link.id,
                    node,
                });
            }
        }
    }

    Ok(())
}
