//! Network review checks, mapped back to labelled assets.

use std::cmp::Ordering;

use hn_analysis::{
    CancellationToken, DispatchOptions, Dispatcher, OrphanAssets, OrphanAssetsCheck, Subnetwork,
    SubnetworksCheck,
};
use hn_core::AssetId;
use hn_graph::{AssetType, HydraulicModel, LinkType, NodeType};
use serde::{Serialize, Serializer};

use crate::error::AppResult;

/// An orphan as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanAsset {
    pub asset_id: AssetId,
    #[serde(rename = "type", serialize_with = "type_name")]
    pub asset_type: AssetType,
    pub label: String,
}

fn type_name<S: Serializer>(ty: &AssetType, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(ty.as_str())
}

/// Higher ranks are listed first.
fn type_rank(ty: AssetType) -> u8 {
    match ty {
        AssetType::Node(NodeType::Reservoir) => 5,
        AssetType::Node(NodeType::Tank) => 4,
        AssetType::Link(LinkType::Valve) => 3,
        AssetType::Link(LinkType::Pump) => 2,
        AssetType::Node(NodeType::Junction) => 1,
        AssetType::Link(LinkType::Pipe) => 0,
    }
}

fn review_order(a: &OrphanAsset, b: &OrphanAsset) -> Ordering {
    type_rank(b.asset_type)
        .cmp(&type_rank(a.asset_type))
        .then_with(|| a.label.to_uppercase().cmp(&b.label.to_uppercase()))
}

/// Attach labels and types, then sort by type rank and label.
///
/// Ids no longer present in `model` are skipped.
pub fn build_orphan_assets(model: &HydraulicModel, raw: &OrphanAssets) -> Vec<OrphanAsset> {
    let mut orphans: Vec<OrphanAsset> = raw
        .orphan_links
        .iter()
        .chain(&raw.orphan_nodes)
        .filter_map(|&id| model.asset(id))
        .map(|asset| OrphanAsset {
            asset_id: asset.id,
            asset_type: asset.asset_type,
            label: asset.label.clone(),
        })
        .collect();
    orphans.sort_by(review_order);
    orphans
}

/// Run the orphan check through the dispatcher and label the result.
pub fn review_orphans(
    model: &HydraulicModel,
    dispatcher: &Dispatcher,
    options: &DispatchOptions,
    cancel: Option<&CancellationToken>,
) -> AppResult<Vec<OrphanAsset>> {
    let raw = dispatcher.run(
        OrphanAssetsCheck,
        model.topology(),
        model.asset_index(),
        options,
        cancel,
    )?;
    let orphans = build_orphan_assets(model, &raw);
    tracing::info!(count = orphans.len(), "orphan review finished");
    Ok(orphans)
}

/// A disconnected part of the network, with labels instead of ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetworkSummary {
    pub subnetwork_id: usize,
    pub node_labels: Vec<String>,
    pub link_labels: Vec<String>,
    pub supply_source_count: usize,
    pub pipe_count: usize,
}

impl SubnetworkSummary {
    pub fn has_supply(&self) -> bool {
        self.supply_source_count > 0
    }
}

fn labels(model: &HydraulicModel, ids: &[AssetId]) -> Vec<String> {
    ids.iter()
        .filter_map(|&id| model.asset(id))
        .map(|asset| asset.label.clone())
        .collect()
}

pub fn build_subnetwork_summaries(
    model: &HydraulicModel,
    raw: &[Subnetwork],
) -> Vec<SubnetworkSummary> {
    raw.iter()
        .map(|sub| SubnetworkSummary {
            subnetwork_id: sub.subnetwork_id,
            node_labels: labels(model, &sub.nodes),
            link_labels: labels(model, &sub.links),
            supply_source_count: sub.supply_source_count,
            pipe_count: sub.pipe_count,
        })
        .collect()
}

/// Run the connectivity trace through the dispatcher and label the result.
pub fn review_subnetworks(
    model: &HydraulicModel,
    dispatcher: &Dispatcher,
    options: &DispatchOptions,
    cancel: Option<&CancellationToken>,
) -> AppResult<Vec<SubnetworkSummary>> {
    let raw = dispatcher.run(
        SubnetworksCheck,
        model.topology(),
        model.asset_index(),
        options,
        cancel,
    )?;
    let summaries = build_subnetwork_summaries(model, &raw);
    tracing::info!(
        count = summaries.len(),
        unsupplied = summaries.iter().filter(|s| !s.has_supply()).count(),
        "connectivity trace finished"
    );
    Ok(summaries)
}
