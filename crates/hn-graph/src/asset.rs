//! Asset kinds and the per-asset record held by the live model.

use core::fmt;

use hn_core::AssetId;

/// Concrete node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Junction,
    Tank,
    Reservoir,
}

/// Concrete link type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkType {
    Pipe,
    Valve,
    Pump,
}

impl NodeType {
    /// Tag written into node type columns. Zero is never used.
    pub fn tag(self) -> u8 {
        match self {
            NodeType::Junction => 1,
            NodeType::Tank => 2,
            NodeType::Reservoir => 3,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(NodeType::Junction),
            2 => Some(NodeType::Tank),
            3 => Some(NodeType::Reservoir),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Junction => "junction",
            NodeType::Tank => "tank",
            NodeType::Reservoir => "reservoir",
        }
    }
}

impl LinkType {
    /// Tag written into link type columns. Zero is never used.
    pub fn tag(self) -> u8 {
        match self {
            LinkType::Pipe => 1,
            LinkType::Valve => 2,
            LinkType::Pump => 3,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(LinkType::Pipe),
            2 => Some(LinkType::Valve),
            3 => Some(LinkType::Pump),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LinkType::Pipe => "pipe",
            LinkType::Valve => "valve",
            LinkType::Pump => "pump",
        }
    }
}

/// Kind and concrete type of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetType {
    Node(NodeType),
    Link(LinkType),
}

impl AssetType {
    pub fn is_node(self) -> bool {
        matches!(self, AssetType::Node(_))
    }

    pub fn is_link(self) -> bool {
        matches!(self, AssetType::Link(_))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetType::Node(ty) => ty.as_str(),
            AssetType::Link(ty) => ty.as_str(),
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node or link of the live model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: AssetId,
    pub label: String,
    pub asset_type: AssetType,
}
